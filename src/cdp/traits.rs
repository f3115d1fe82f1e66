//! CDP layer traits
//!
//! This module defines the abstract interface for a connection to one
//! debugging target.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use crate::Result;

/// Handler invoked with the params of each matching notification.
///
/// Handlers run synchronously on the connection's read task, so every
/// handler observes notifications in transport arrival order.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Connection to a single debugging target.
///
/// One persistent transport; concurrent outstanding requests are allowed and
/// correlated independently, so a slow command never blocks an unrelated one.
#[async_trait]
pub trait CdpConnection: Send + Sync + std::fmt::Debug {
    /// Send a command and wait for its correlated response.
    ///
    /// Pass `Value::Null` for commands without parameters. A target-reported
    /// command error surfaces as [`Error::Rpc`](crate::Error::Rpc); a
    /// transport failure while the request is in flight surfaces as
    /// [`Error::TransportClosed`](crate::Error::TransportClosed).
    async fn request(&self, method: &str, params: Value) -> Result<Value>;

    /// Register a notification handler.
    ///
    /// Multiple handlers may be registered for the same event name; they are
    /// invoked in registration order, once per matching notification. There
    /// is no unsubscription.
    fn on(&self, event: &str, handler: EventHandler);

    /// Whether the underlying transport is still usable.
    fn is_active(&self) -> bool;

    /// Close the transport.
    async fn close(&self) -> Result<()>;
}
