//! Console actor
//!
//! Minimal console endpoint advertised in every tab form. Constructed on
//! first addressed packet through the registry's deferred slot; reports no
//! listeners and no cached messages.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::registry::Actor;
use super::tab::TabActor;
use crate::error::{Error, Result};

/// Console actor for one tab
pub struct ConsoleActor {
    /// Assigned actor name
    name: String,
    /// Owning tab actor
    tab: Arc<TabActor>,
}

impl ConsoleActor {
    /// Create the console actor for a tab
    pub fn new(name: String, tab: Arc<TabActor>) -> Self {
        debug!("console actor {} created for {}", name, tab.name());
        Self { name, tab }
    }
}

#[async_trait]
impl Actor for ConsoleActor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, packet_type: &str, _packet: &Value) -> Result<Value> {
        debug!(
            "console request {} for tab {}",
            packet_type,
            self.tab.name()
        );

        match packet_type {
            "startListeners" => Ok(json!({
                "from": self.name,
                "startedListeners": [],
                "nativeConsoleAPI": true,
            })),
            "stopListeners" => Ok(json!({
                "from": self.name,
                "stoppedListeners": [],
            })),
            "getCachedMessages" => Ok(json!({
                "from": self.name,
                "messages": [],
            })),
            other => Err(Error::unrecognized_packet(&self.name, other)),
        }
    }
}
