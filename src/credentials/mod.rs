//! Access credential issuance.
//!
//! # Data Flow
//! ```text
//! Token request (channel, role, token type, uid, expiry)
//!     → types.rs (CredentialRequest: scope + expiry)
//!     → CredentialIssuer::issue
//!     → signer.rs (HMAC-SHA256 over the serialized payload)
//! ```
//!
//! # Security Constraints
//! - The app certificate never leaves the issuer and is redacted in Debug
//! - Signing happens outside the registry lock

pub mod signer;
pub mod types;

pub use signer::{CredentialClaims, HmacCredentialIssuer};
pub use types::{
    expires_in, unix_now, CredentialError, CredentialKind, CredentialRequest, Role, Scope,
    Subject, SubjectError,
};

/// Builds time-limited credentials for the media platform.
pub trait CredentialIssuer: Send + Sync {
    /// Sign a credential for the given request.
    fn issue(&self, request: &CredentialRequest) -> Result<String, CredentialError>;

    /// Application id the credentials are bound to.
    fn app_id(&self) -> &str;
}
