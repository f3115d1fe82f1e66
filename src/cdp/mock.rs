//! Mock CDP connection for testing
//!
//! Scripted implementation of [`CdpConnection`]: responses are stubbed per
//! method, sent commands are recorded, and tests drive notifications by hand.

use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use super::traits::{CdpConnection, EventHandler};
use crate::error::{Error, Result};

/// Mock CDP connection
#[derive(Default)]
pub struct MockCdpConnection {
    /// Stubbed results, keyed by method
    responses: Mutex<HashMap<String, Value>>,
    /// Commands sent through this connection, in order
    requests: Mutex<Vec<(String, Value)>>,
    /// Notification handlers, in registration order per event name
    handlers: Mutex<HashMap<String, Vec<EventHandler>>>,
    /// Simulates transport loss when cleared
    closed: AtomicBool,
}

impl std::fmt::Debug for MockCdpConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockCdpConnection")
            .field("active", &self.is_active())
            .finish()
    }
}

impl MockCdpConnection {
    /// Create a new mock connection
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub the result returned for a method
    pub fn stub<S: Into<String>>(&self, method: S, result: Value) {
        self.responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(method.into(), result);
    }

    /// Commands sent so far, in order
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Deliver a notification to every matching handler, in order
    pub fn emit(&self, event: &str, params: Value) {
        let matching: Vec<EventHandler> = self
            .handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(event)
            .cloned()
            .unwrap_or_default();
        for handler in matching {
            handler(&params);
        }
    }

    /// Simulate the transport going away
    pub fn close_transport(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl CdpConnection for MockCdpConnection {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(Error::TransportClosed);
        }

        self.requests
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push((method.to_string(), params));

        let result = self
            .responses
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(method)
            .cloned()
            .unwrap_or_else(|| json!({}));
        Ok(result)
    }

    fn on(&self, event: &str, handler: EventHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .entry(event.to_string())
            .or_default()
            .push(handler);
    }

    fn is_active(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<()> {
        self.close_transport();
        Ok(())
    }
}
