//! Tab actor
//!
//! One per discovered tab. Owns the RPC connection to the tab's debugging
//! endpoint, tracks which frame is the tab's top-level document, and folds
//! the target's two frame-lifecycle notifications into the client protocol's
//! single two-phase navigation event.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use super::console::ConsoleActor;
use super::registry::{Actor, ActorRef, ActorRegistry};
use super::ClientSink;
use crate::cdp::traits::CdpConnection;
use crate::cdp::types::{FrameNavigated, FrameStartedLoading, ResourceTree, TabDescriptor};
use crate::error::{Error, Result};
use crate::protocol::types::{TabForm, TabNavigatedEvent};

/// Root-frame identifier and URL of the tab's current document.
///
/// Both stay unset until `attach` fetches the resource tree; afterwards only
/// top-level frameNavigated notifications move them.
#[derive(Debug, Clone, Default)]
struct NavigationState {
    root_frame_id: Option<String>,
    url: Option<String>,
}

/// Actor for one debuggable tab
pub struct TabActor {
    /// Assigned actor name, stable for the bridge's lifetime
    name: String,
    /// Descriptor the tab was discovered with
    descriptor: TabDescriptor,
    /// RPC connection to the tab, created once and never replaced
    connection: Arc<dyn CdpConnection>,
    /// Name of the lazily-built console actor
    console_id: String,
    /// Navigation state, written only by this tab's event handlers
    navigation: Arc<Mutex<NavigationState>>,
}

impl TabActor {
    /// Create the actor for a newly discovered tab
    ///
    /// Performs no I/O: the connection dials on first use. Frame-lifecycle
    /// handlers are registered here so no notification can slip past between
    /// dial and subscription, and the console actor is parked in the
    /// registry as a deferred slot.
    pub fn new(
        registry: &ActorRegistry,
        sink: ClientSink,
        descriptor: &TabDescriptor,
        connection: Arc<dyn CdpConnection>,
    ) -> Arc<Self> {
        let name = registry.alloc_id("tab");
        let console_id = registry.alloc_id("console");
        let navigation = Arc::new(Mutex::new(NavigationState::default()));

        debug!("tab actor {} created for target tab {}", name, descriptor.id);

        let actor = Arc::new(Self {
            name: name.clone(),
            descriptor: descriptor.clone(),
            connection,
            console_id: console_id.clone(),
            navigation: Arc::clone(&navigation),
        });

        {
            let navigation = Arc::clone(&navigation);
            let sink = sink.clone();
            let actor_name = name.clone();
            actor.connection.on(
                "Page.frameStartedLoading",
                Arc::new(move |params: &Value| {
                    on_frame_started_loading(&navigation, &sink, &actor_name, params)
                }),
            );
        }
        {
            let navigation = Arc::clone(&navigation);
            let sink = sink.clone();
            let actor_name = name.clone();
            actor.connection.on(
                "Page.frameNavigated",
                Arc::new(move |params: &Value| {
                    on_frame_navigated(&navigation, &sink, &actor_name, params)
                }),
            );
        }

        registry.register(actor.clone());

        let console_tab = Arc::clone(&actor);
        let console_name = console_id.clone();
        registry.register_deferred(
            &console_id,
            Box::new(move || Arc::new(ConsoleActor::new(console_name, console_tab)) as ActorRef),
        );

        actor
    }

    /// Projection of this tab for the client, as carried in listTabs replies
    pub fn form(&self) -> TabForm {
        TabForm {
            actor: self.name.clone(),
            title: self.descriptor.title.clone(),
            url: self.descriptor.url.clone(),
            console_actor: self.console_id.clone(),
        }
    }

    /// Establish the navigation baseline and enable frame notifications
    ///
    /// Re-invoking before `detach` re-fetches the baseline and re-enables
    /// notifications; neither corrupts state.
    pub async fn attach(&self) -> Result<()> {
        let result = self.connection.request("Page.getResourceTree", Value::Null).await?;
        let resources: ResourceTree = serde_json::from_value(result)?;

        {
            let mut navigation = self
                .navigation
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            navigation.root_frame_id = Some(resources.frame_tree.frame.id);
            navigation.url = Some(resources.frame_tree.frame.url);
        }

        self.connection.request("Page.enable", Value::Null).await?;
        Ok(())
    }

    /// Disable frame notifications
    ///
    /// The actor itself stays in the registry.
    pub async fn detach(&self) -> Result<()> {
        self.connection.request("Page.disable", Value::Null).await?;
        Ok(())
    }
}

#[async_trait]
impl Actor for TabActor {
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, packet_type: &str, _packet: &Value) -> Result<Value> {
        match packet_type {
            "attach" => {
                self.attach().await?;
                Ok(json!({"from": self.name}))
            }
            "detach" => {
                self.detach().await?;
                Ok(json!({"from": self.name}))
            }
            other => Err(Error::unrecognized_packet(&self.name, other)),
        }
    }
}

impl std::fmt::Debug for TabActor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabActor")
            .field("name", &self.name)
            .field("tab_id", &self.descriptor.id)
            .finish()
    }
}

/// A load began somewhere in the tab. Only the tracked root frame maps to a
/// client event; it carries the URL being left and does not move state.
fn on_frame_started_loading(
    navigation: &Mutex<NavigationState>,
    sink: &ClientSink,
    actor: &str,
    params: &Value,
) {
    let event: FrameStartedLoading = match serde_json::from_value(params.clone()) {
        Ok(event) => event,
        Err(e) => {
            debug!("ignoring malformed frameStartedLoading: {}", e);
            return;
        }
    };

    let previous_url = {
        let navigation = navigation.lock().unwrap_or_else(PoisonError::into_inner);
        match &navigation.root_frame_id {
            Some(root) if *root == event.frame_id => navigation.url.clone().unwrap_or_default(),
            _ => return,
        }
    };

    emit_navigated(sink, actor, &previous_url, "start");
}

/// A frame finished navigating. Frames with a parent are subordinate and
/// ignored; a top-level navigation moves the tracked state and closes the
/// two-phase event with the new URL.
fn on_frame_navigated(
    navigation: &Mutex<NavigationState>,
    sink: &ClientSink,
    actor: &str,
    params: &Value,
) {
    let event: FrameNavigated = match serde_json::from_value(params.clone()) {
        Ok(event) => event,
        Err(e) => {
            debug!("ignoring malformed frameNavigated: {}", e);
            return;
        }
    };

    if event.frame.parent_id.is_some() {
        return;
    }

    {
        let mut navigation = navigation.lock().unwrap_or_else(PoisonError::into_inner);
        navigation.root_frame_id = Some(event.frame.id);
        navigation.url = Some(event.frame.url.clone());
    }

    emit_navigated(sink, actor, &event.frame.url, "stop");
}

fn emit_navigated(sink: &ClientSink, actor: &str, url: &str, state: &str) {
    let event = TabNavigatedEvent::new(actor, url, state);
    match serde_json::to_value(&event) {
        Ok(packet) => {
            if sink.send(packet).is_err() {
                debug!("client gone, dropping tabNavigated for {}", actor);
            }
        }
        Err(e) => warn!("failed to serialize tabNavigated: {}", e),
    }
}

#[cfg(test)]
impl TabActor {
    fn navigation_snapshot(&self) -> (Option<String>, Option<String>) {
        let navigation = self.navigation.lock().unwrap();
        (navigation.root_frame_id.clone(), navigation.url.clone())
    }
}
