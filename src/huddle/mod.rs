//! Huddle registry subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP handlers (create/join/leave/end/list)
//!     → registry.rs (single RwLock, atomic operations)
//!     → types.rs (Huddle snapshots handed back to callers)
//!
//! Token issuance path:
//!     get_or_create(channel, user) → join_by_channel(channel, user)
//!     → credential signing (outside the lock)
//! ```
//!
//! # Design Decisions
//! - One lock guards both the id map and the channel index
//! - Readers share the lock, every mutation is exclusive
//! - Callers only ever see cloned snapshots
//! - Nothing is persisted; process exit drops every huddle

pub mod error;
pub mod registry;
pub mod types;

pub use error::{HuddleError, Lookup};
pub use registry::HuddleRegistry;
pub use types::{Huddle, HuddleId};
