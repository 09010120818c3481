//! Cross-origin resource sharing.
//!
//! Preflight requests are answered by the layer before routing. With the
//! default `*` origin, credentials are not advertised; an explicit origin
//! list enables them.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;

const ALLOWED_HEADERS: [&str; 9] = [
    "content-type",
    "content-length",
    "accept-encoding",
    "x-csrf-token",
    "authorization",
    "accept",
    "origin",
    "cache-control",
    "x-requested-with",
];

const ALLOWED_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(ALLOWED_METHODS)
        .allow_headers(ALLOWED_HEADERS.map(HeaderName::from_static));

    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    // Invalid origins are rejected by config validation.
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
