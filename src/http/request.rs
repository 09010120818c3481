//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4) and echo it on the response
//! - Deserialize and check JSON request bodies
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Bodies are decoded as JSON whatever their `Content-Type`
//! - A body that fails to parse and a body missing a required field get the
//!   same client message; a body over the size limit keeps its 413

use axum::{
    body::Bytes,
    extract::rejection::BytesRejection,
    http::{HeaderMap, HeaderName, StatusCode},
};
use serde::{de::DeserializeOwned, Deserialize};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};

use crate::http::error::ApiError;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Assigns an `x-request-id` to requests that arrive without one.
pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid)
}

/// Copies the request's `x-request-id` onto the response.
pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::new(X_REQUEST_ID)
}

pub trait RequestIdExt {
    fn request_id(&self) -> &str;
}

impl RequestIdExt for HeaderMap {
    fn request_id(&self) -> &str {
        self.get(&X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown")
    }
}

/// Request body with required, non-empty fields.
pub trait RequiredFields {
    /// Client message when a field is missing or empty.
    const MISSING: &'static str;

    fn is_complete(&self) -> bool;
}

/// Decode a JSON body, rejecting it unless every required field is present.
pub fn require<T>(body: Result<Bytes, BytesRejection>) -> Result<T, ApiError>
where
    T: DeserializeOwned + RequiredFields,
{
    let bytes = match body {
        Ok(bytes) => bytes,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            return Err(ApiError::PayloadTooLarge(rejection.body_text()));
        }
        Err(rejection) => {
            tracing::debug!(error = %rejection.body_text(), "Unreadable request body");
            return Err(ApiError::BadRequest(T::MISSING.to_string()));
        }
    };

    match serde_json::from_slice::<T>(&bytes) {
        Ok(value) if value.is_complete() => Ok(value),
        Ok(_) => Err(ApiError::BadRequest(T::MISSING.to_string())),
        Err(e) => {
            tracing::debug!(error = %e, "Rejected request body");
            Err(ApiError::BadRequest(T::MISSING.to_string()))
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateHuddleRequest {
    #[serde(default)]
    pub created_by: String,
}

impl RequiredFields for CreateHuddleRequest {
    const MISSING: &'static str = "created_by is required";

    fn is_complete(&self) -> bool {
        !self.created_by.is_empty()
    }
}

/// Body of join and leave requests.
#[derive(Debug, Deserialize)]
pub struct MembershipRequest {
    #[serde(default)]
    pub huddle_id: String,
    #[serde(default)]
    pub user_id: String,
}

impl RequiredFields for MembershipRequest {
    const MISSING: &'static str = "huddle_id and user_id are required";

    fn is_complete(&self) -> bool {
        !self.huddle_id.is_empty() && !self.user_id.is_empty()
    }
}

#[derive(Debug, Deserialize)]
pub struct EndHuddleRequest {
    #[serde(default)]
    pub huddle_id: String,
}

impl RequiredFields for EndHuddleRequest {
    const MISSING: &'static str = "huddle_id is required";

    fn is_complete(&self) -> bool {
        !self.huddle_id.is_empty()
    }
}

/// Path of the RTC and combined token routes.
#[derive(Debug, Deserialize)]
pub struct TokenPath {
    pub channel_name: String,
    pub role: String,
    pub token_type: String,
    pub uid: String,
}

/// Query string of every token route.
#[derive(Debug, Default, Deserialize)]
pub struct ExpiryQuery {
    pub expiry: Option<String>,
}

impl ExpiryQuery {
    /// Requested lifetime in seconds, or `default_secs` when absent.
    pub fn ttl_secs(&self, default_secs: u32) -> Result<u32, ApiError> {
        match self.expiry.as_deref() {
            None => Ok(default_secs),
            Some(raw) => raw.parse::<u32>().map_err(|e| {
                ApiError::BadRequest(format!("failed to parse expiry {:?}: {}", raw, e))
            }),
        }
    }
}
