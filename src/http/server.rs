//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (CORS, request ID, tracing, limits, timeout, metrics)
//! - Own the huddle registry and credential issuer for the process lifetime
//! - Serve until the shutdown signal fires

use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::credentials::{CredentialIssuer, CredentialRequest, HmacCredentialIssuer};
use crate::http::cors::cors_layer;
use crate::http::error::ApiError;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer};
use crate::http::response::MessageResponse;
use crate::http::{huddles, tokens};
use crate::huddle::HuddleRegistry;
use crate::lifecycle::ShutdownReason;
use crate::observability::metrics;
use crate::observability::tracing::make_request_span;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<HuddleRegistry>,
    pub issuer: Arc<dyn CredentialIssuer>,
    pub default_expiry_secs: u32,
}

impl AppState {
    pub fn new(
        registry: Arc<HuddleRegistry>,
        issuer: Arc<dyn CredentialIssuer>,
        default_expiry_secs: u32,
    ) -> Self {
        Self {
            registry,
            issuer,
            default_expiry_secs,
        }
    }

    /// Sign a credential and count it.
    pub(crate) fn issue(&self, request: &CredentialRequest) -> Result<String, ApiError> {
        let token = self.issuer.issue(request)?;
        metrics::record_credential_issued(request.kind().as_str());
        Ok(token)
    }
}

/// HTTP server for the huddle service.
pub struct HttpServer {
    router: Router,
    registry: Arc<HuddleRegistry>,
}

impl HttpServer {
    /// Create a new HTTP server signing credentials with the configured certificate.
    pub fn new(config: AppConfig) -> Self {
        let issuer = Arc::new(HmacCredentialIssuer::new(
            &config.credentials.app_id,
            &config.credentials.app_certificate,
        ));
        Self::with_issuer(config, issuer)
    }

    /// Create a new HTTP server with a caller-supplied credential issuer.
    pub fn with_issuer(config: AppConfig, issuer: Arc<dyn CredentialIssuer>) -> Self {
        let registry = Arc::new(HuddleRegistry::new());
        let state = AppState::new(
            registry.clone(),
            issuer,
            config.credentials.default_expiry_secs,
        );

        let router = Self::build_router(&config, state);
        Self { router, registry }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/ping", get(ping))
            // Explicit huddle management
            .route("/huddle/create", post(huddles::create_huddle))
            .route("/huddle/join", post(huddles::join_huddle))
            .route("/huddle/leave", post(huddles::leave_huddle))
            .route("/huddle/end", post(huddles::end_huddle))
            .route("/huddle/list", get(huddles::list_huddles))
            .route("/huddles", get(huddles::list_huddles))
            .route("/huddles/{channel_name}", delete(huddles::end_huddle_by_channel))
            // Token issuance with automatic huddle tracking
            .route("/rtc/{channel_name}/{role}/{token_type}/{uid}", get(tokens::rtc_token))
            .route("/rtc/{channel_name}/{role}/{token_type}/{uid}/", get(tokens::rtc_token))
            .route("/rtm/{uid}", get(tokens::rtm_token))
            .route("/rtm/{uid}/", get(tokens::rtm_token))
            .route("/rte/{channel_name}/{role}/{token_type}/{uid}", get(tokens::rte_token))
            .route("/rte/{channel_name}/{role}/{token_type}/{uid}/", get(tokens::rte_token))
            .route_layer(middleware::from_fn(metrics::track_requests))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_bytes))
            .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
            .layer(cors_layer(&config.cors))
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<ShutdownReason>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let registry = self.registry.clone();
        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let reason = shutdown.recv().await.unwrap_or(ShutdownReason::Requested);
                tracing::info!(
                    %reason,
                    active_huddles = registry.len(),
                    "Draining in-flight requests"
                );
            })
            .await?;

        tracing::info!(
            active_huddles = self.registry.len(),
            "HTTP server stopped, discarding in-memory huddles"
        );
        Ok(())
    }

    /// Router with all layers applied, for in-process requests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Registry shared with the handlers.
    pub fn registry(&self) -> Arc<HuddleRegistry> {
        self.registry.clone()
    }
}

async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::new("pong"))
}
