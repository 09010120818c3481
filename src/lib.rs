//! Huddle backend library.
//!
//! Issues short-lived media-platform credentials and tracks ad-hoc group
//! call sessions ("huddles") in memory.

pub mod config;
pub mod credentials;
pub mod http;
pub mod huddle;
pub mod lifecycle;
pub mod observability;

pub use config::AppConfig;
pub use http::HttpServer;
pub use huddle::{Huddle, HuddleError, HuddleId, HuddleRegistry};
pub use lifecycle::Shutdown;
