//! HMAC-SHA256 credential signer.
//!
//! Token layout: `1<payload>.<signature>` where both parts are unpadded
//! URL-safe base64, the payload is the JSON-encoded [`CredentialClaims`] and
//! the signature is HMAC-SHA256 of the raw payload keyed by the app
//! certificate.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

use crate::credentials::types::{unix_now, CredentialError, CredentialRequest, Scope};
use crate::credentials::CredentialIssuer;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_VERSION: &str = "1";

/// Signed content of a credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    pub app_id: String,
    #[serde(flatten)]
    pub scope: Scope,
    /// Issued-at, unix seconds.
    pub iat: u32,
    /// Expiry, unix seconds.
    pub exp: u32,
}

/// Issues credentials signed with the application certificate.
#[derive(Clone)]
pub struct HmacCredentialIssuer {
    app_id: String,
    app_certificate: String,
}

impl fmt::Debug for HmacCredentialIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacCredentialIssuer")
            .field("app_id", &self.app_id)
            .field("app_certificate", &"[REDACTED]")
            .finish()
    }
}

impl HmacCredentialIssuer {
    pub fn new(app_id: impl Into<String>, app_certificate: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            app_certificate: app_certificate.into(),
        }
    }

    fn mac(&self) -> Result<HmacSha256, CredentialError> {
        HmacSha256::new_from_slice(self.app_certificate.as_bytes())
            .map_err(|e| CredentialError::InvalidKey(e.to_string()))
    }

    /// Check a token's signature and return its claims.
    ///
    /// Expiry is not enforced here; callers compare `exp` themselves.
    pub fn verify(&self, token: &str) -> Result<CredentialClaims, CredentialError> {
        let body = token
            .strip_prefix(TOKEN_VERSION)
            .ok_or(CredentialError::Malformed)?;
        let (payload_b64, signature_b64) =
            body.split_once('.').ok_or(CredentialError::Malformed)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CredentialError::Malformed)?;
        let signature = URL_SAFE_NO_PAD
            .decode(signature_b64)
            .map_err(|_| CredentialError::Malformed)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        mac.verify_slice(&signature)
            .map_err(|_| CredentialError::BadSignature)?;

        Ok(serde_json::from_slice(&payload)?)
    }
}

impl CredentialIssuer for HmacCredentialIssuer {
    fn issue(&self, request: &CredentialRequest) -> Result<String, CredentialError> {
        let claims = CredentialClaims {
            app_id: self.app_id.clone(),
            scope: request.scope.clone(),
            iat: unix_now(),
            exp: request.expires_at,
        };
        let payload = serde_json::to_vec(&claims)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        Ok(format!(
            "{}{}.{}",
            TOKEN_VERSION,
            URL_SAFE_NO_PAD.encode(&payload),
            URL_SAFE_NO_PAD.encode(signature)
        ))
    }

    fn app_id(&self) -> &str {
        &self.app_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::types::{expires_in, Role, Subject};

    fn issuer() -> HmacCredentialIssuer {
        HmacCredentialIssuer::new("app-123", "s3cret-certificate")
    }

    #[test]
    fn test_rtc_credential_carries_scope() {
        let issuer = issuer();
        let request = CredentialRequest::rtc(
            "standup",
            Subject::Account("alice".into()),
            Role::Publisher,
            expires_in(3600),
        );

        let token = issuer.issue(&request).unwrap();
        assert!(token.starts_with(TOKEN_VERSION));

        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.app_id, "app-123");
        assert_eq!(claims.scope, request.scope);
        assert_eq!(claims.exp, request.expires_at);
        assert!(claims.iat <= claims.exp);
    }

    #[test]
    fn test_rtm_credential() {
        let issuer = issuer();
        let token = issuer
            .issue(&CredentialRequest::rtm("alice", expires_in(60)))
            .unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(
            claims.scope,
            Scope::Rtm {
                user_id: "alice".into()
            }
        );
    }

    #[test]
    fn test_other_certificate_rejects_token() {
        let token = issuer()
            .issue(&CredentialRequest::rtc(
                "standup",
                Subject::Uid(7),
                Role::Subscriber,
                expires_in(60),
            ))
            .unwrap();

        let other = HmacCredentialIssuer::new("app-123", "different");
        assert!(matches!(
            other.verify(&token),
            Err(CredentialError::BadSignature)
        ));
    }

    #[test]
    fn test_tampered_or_malformed_tokens() {
        let issuer = issuer();
        let token = issuer
            .issue(&CredentialRequest::rtm("alice", expires_in(60)))
            .unwrap();

        let (payload, signature) = token[1..].split_once('.').unwrap();
        let forged_payload = URL_SAFE_NO_PAD.encode(
            br#"{"app_id":"app-123","kind":"rtm","user_id":"mallory","iat":0,"exp":4294967295}"#,
        );
        let forged = format!("1{}.{}", forged_payload, signature);
        assert!(matches!(
            issuer.verify(&forged),
            Err(CredentialError::BadSignature)
        ));

        assert!(matches!(
            issuer.verify(&format!("2{}.{}", payload, signature)),
            Err(CredentialError::Malformed)
        ));
        assert!(matches!(
            issuer.verify("1no-separator"),
            Err(CredentialError::Malformed)
        ));
    }

    #[test]
    fn test_debug_redacts_certificate() {
        let rendered = format!("{:?}", issuer());
        assert!(rendered.contains("app-123"));
        assert!(!rendered.contains("s3cret"));
    }
}
