//! API error type.
//!
//! Every error maps to a status code and a `{"error": "..."}` body via the
//! `IntoResponse` impl. Signing failures are logged server-side and reported
//! to clients with a generic message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::credentials::{CredentialError, SubjectError};
use crate::huddle::{HuddleError, Lookup};

/// Maps to HTTP status codes:
/// - BadRequest: 400 Bad Request
/// - NotFound: 404 Not Found
/// - PayloadTooLarge: 413 Payload Too Large
/// - Credential: 500 Internal Server Error
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("credential signing failed: {0}")]
    Credential(#[from] CredentialError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Credential(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<HuddleError> for ApiError {
    fn from(err: HuddleError) -> Self {
        let message = match err.lookup() {
            Lookup::Participant { .. } => "user not in huddle",
            Lookup::Id(_) | Lookup::Channel(_) => "huddle not found",
        };
        ApiError::NotFound(message.to_string())
    }
}

impl From<SubjectError> for ApiError {
    fn from(err: SubjectError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::PayloadTooLarge(msg) => msg.clone(),
            ApiError::Credential(err) => {
                tracing::error!(error = %err, "Credential signing failed");
                "failed to generate token".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
