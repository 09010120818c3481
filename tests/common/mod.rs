//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;

use huddle_backend::config::AppConfig;
use huddle_backend::credentials::HmacCredentialIssuer;
use huddle_backend::http::HttpServer;
use huddle_backend::huddle::HuddleRegistry;
use huddle_backend::lifecycle::{Shutdown, ShutdownReason};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const APP_ID: &str = "test-app-id";
pub const APP_CERTIFICATE: &str = "test-app-certificate";

/// A server running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub registry: Arc<HuddleRegistry>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    #[allow(dead_code)]
    pub fn issuer(&self) -> HmacCredentialIssuer {
        HmacCredentialIssuer::new(APP_ID, APP_CERTIFICATE)
    }

    /// Signal shutdown and wait for the server task to finish.
    #[allow(dead_code)]
    pub async fn stop(self) {
        self.shutdown.trigger(ShutdownReason::Requested);
        let _ = self.handle.await;
    }
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config.credentials.app_id = APP_ID.to_string();
    config.credentials.app_certificate = APP_CERTIFICATE.to_string();
    config
}

/// Bind 127.0.0.1:0 and serve in a background task.
pub async fn spawn_server() -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = HttpServer::new(test_config());
    let registry = server.registry();
    let shutdown = Shutdown::new();
    let rx = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, rx).await });

    TestServer {
        addr,
        registry,
        shutdown,
        handle,
    }
}
