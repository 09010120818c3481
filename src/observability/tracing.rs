//! Request spans.
//!
//! Each request gets one span carrying method, path and the correlation id
//! set by the request-id layer, so every event logged by a handler can be
//! tied back to the request that caused it.

use axum::{body::Body, http::Request};
use ::tracing::Span;

use crate::http::request::RequestIdExt;

/// `make_span_with` callback for `TraceLayer`.
pub fn make_request_span(request: &Request<Body>) -> Span {
    ::tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request.headers().request_id(),
    )
}
