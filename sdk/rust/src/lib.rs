//! Typed client for the huddle backend HTTP API.

pub mod client;

pub use client::{HuddleClient, SdkError};
