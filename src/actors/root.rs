//! Root actor
//!
//! One per client connection. Announces capabilities, enumerates the
//! target's tabs, and maintains the mapping from target-assigned tab
//! identifiers to long-lived tab actors.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use super::registry::{Actor, ActorRegistry};
use super::tab::TabActor;
use super::ClientSink;
use crate::cdp::discovery;
use crate::cdp::traits::CdpConnection;
use crate::cdp::types::TabDescriptor;
use crate::error::{Error, Result};
use crate::protocol::types::{HelloPacket, TabListReply, ROOT_ACTOR};

/// Builds the RPC connection for a newly discovered tab
///
/// Must not perform I/O; tab actors are created during enumeration and the
/// returned connection dials on first use.
pub type ConnectionFactory = Arc<dyn Fn(&TabDescriptor) -> Arc<dyn CdpConnection> + Send + Sync>;

/// Root actor for one client connection
pub struct RootActor {
    /// Registry the tab and console actors live in
    registry: Arc<ActorRegistry>,
    /// Outbound channel to the client
    sink: ClientSink,
    /// Base URL of the target's discovery endpoint
    discovery_url: String,
    /// Connection builder for new tab actors
    connect: ConnectionFactory,
    /// Tab actors, keyed by target-assigned tab identifier. Entries are
    /// never removed; a tab the target stops listing simply drops out of
    /// future listTabs replies while its actor lingers.
    tabs: Mutex<HashMap<String, Arc<TabActor>>>,
}

impl RootActor {
    /// Create the root actor for a freshly accepted client connection
    pub fn new(
        registry: Arc<ActorRegistry>,
        sink: ClientSink,
        discovery_url: String,
        connect: ConnectionFactory,
    ) -> Arc<Self> {
        Arc::new(Self {
            registry,
            sink,
            discovery_url,
            connect,
            tabs: Mutex::new(HashMap::new()),
        })
    }

    /// Send the one-time capability announcement
    pub fn say_hello(&self) {
        match serde_json::to_value(HelloPacket::new()) {
            Ok(packet) => {
                if self.sink.send(packet).is_err() {
                    debug!("client went away before the hello announcement");
                }
            }
            Err(e) => warn!("failed to serialize hello announcement: {}", e),
        }
    }

    /// Enumerate the target's tabs
    ///
    /// Descriptors without a live debugging endpoint are skipped; the rest
    /// are mirrored into tab actors in discovery order. `selected` points at
    /// the first kept descriptor of type "page" and is omitted when none
    /// qualifies.
    pub async fn list_tabs(&self) -> Result<TabListReply> {
        let descriptors = discovery::fetch_tabs(&self.discovery_url).await?;
        Ok(self.assemble_tab_list(descriptors))
    }

    fn assemble_tab_list(&self, descriptors: Vec<TabDescriptor>) -> TabListReply {
        let mut tabs = Vec::new();
        let mut selected = None;

        for descriptor in descriptors {
            if descriptor.web_socket_debugger_url.is_none() {
                continue;
            }

            let actor = self.tab_actor_for(&descriptor);
            if selected.is_none() && descriptor.kind == "page" {
                selected = Some(tabs.len());
            }
            tabs.push(actor.form());
        }

        TabListReply {
            from: ROOT_ACTOR.to_string(),
            tabs,
            selected,
        }
    }

    /// Look up the tab actor for a descriptor, creating it on first sight
    ///
    /// Idempotent per target tab identifier. Construction performs no I/O,
    /// so the check-then-insert stays atomic under the map lock.
    pub fn tab_actor_for(&self, descriptor: &TabDescriptor) -> Arc<TabActor> {
        let mut tabs = self.tabs.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(actor) = tabs.get(&descriptor.id) {
            return Arc::clone(actor);
        }

        let actor = TabActor::new(
            &self.registry,
            self.sink.clone(),
            descriptor,
            (self.connect)(descriptor),
        );
        tabs.insert(descriptor.id.clone(), Arc::clone(&actor));
        actor
    }
}

#[async_trait]
impl Actor for RootActor {
    fn name(&self) -> &str {
        ROOT_ACTOR
    }

    async fn handle(&self, packet_type: &str, _packet: &Value) -> Result<Value> {
        match packet_type {
            "listTabs" => Ok(serde_json::to_value(self.list_tabs().await?)?),
            other => Err(Error::unrecognized_packet(ROOT_ACTOR, other)),
        }
    }
}

impl std::fmt::Debug for RootActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RootActor")
            .field("discovery_url", &self.discovery_url)
            .finish()
    }
}
