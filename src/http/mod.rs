//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack)
//!     → cors.rs (preflight answered here)
//!     → request.rs (request ID, body parsing)
//!     → huddles.rs / tokens.rs (registry + credential calls)
//!     → response.rs / error.rs (JSON bodies)
//!     → Send to client
//! ```

pub mod cors;
pub mod error;
pub mod huddles;
pub mod request;
pub mod response;
pub mod server;
pub mod tokens;

pub use error::ApiError;
pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
