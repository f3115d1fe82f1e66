//! Devtools-Bridge: expose Chromium remote-debugging targets to clients of
//! the devtools actor protocol.
//!
//! The bridge discovers debuggable tabs over the target's HTTP endpoint,
//! mirrors each one into a long-lived tab actor, and translates the target's
//! frame-lifecycle notifications into the single normalized navigation event
//! the client protocol understands.

pub mod error;
pub mod config;

pub mod cdp;
pub mod protocol;
pub mod actors;
pub mod server;

// Re-exports
pub use error::{Error, Result};
pub use server::BridgeServer;

/// Devtools-Bridge library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
