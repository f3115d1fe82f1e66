//! Chrome DevTools Protocol (CDP) layer
//!
//! WebSocket communication with the debugging target: command/response
//! correlation, notification fan-out, and tab discovery over the target's
//! HTTP endpoint.
//!
//! Module structure:
//! - `traits`: the connection contract the actor layer programs against
//! - `types`: CDP wire types and tab descriptors
//! - `connection`: WebSocket implementation plus the lazy-dialing wrapper
//! - `discovery`: tab enumeration over `GET <base-url>/json`
//! - `mock`: scripted implementation for tests

pub mod traits;
pub mod types;
pub mod connection;
pub mod discovery;
pub mod mock;

pub use traits::{CdpConnection, EventHandler};
pub use types::{CdpNotification, CdpRequest, CdpResponse, TabDescriptor};

// Re-export implementation structs
pub use connection::{CdpWebSocketConnection, LazyCdpConnection};

// Re-export mock for development/testing
pub use mock::MockCdpConnection;
