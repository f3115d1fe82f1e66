//! Actor registry
//!
//! Names actors on one client connection and resolves request packets to
//! them. A slot is either a live actor or a deferred constructor that is
//! promoted, at most once, on first lookup. Promotion runs under the write
//! lock and performs no I/O, so lookup-or-create is atomic.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use crate::error::Result;

/// A protocol endpoint addressable by name on a client connection
#[async_trait]
pub trait Actor: Send + Sync {
    /// Name this actor is addressed by
    fn name(&self) -> &str;

    /// Handle one request packet addressed to this actor
    ///
    /// Returns the complete reply packet, `from` included.
    async fn handle(&self, packet_type: &str, packet: &Value) -> Result<Value>;
}

/// Shared actor handle
pub type ActorRef = std::sync::Arc<dyn Actor>;

/// Deferred actor constructor, run on first lookup
pub type DeferredCtor = Box<dyn FnOnce() -> ActorRef + Send + Sync>;

enum Slot {
    Ready(ActorRef),
    Deferred(DeferredCtor),
}

/// Actor registry for one client connection
pub struct ActorRegistry {
    /// Next actor number
    next_id: AtomicU64,
    /// Actor slots, keyed by actor name
    slots: RwLock<HashMap<String, Slot>>,
}

impl ActorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            slots: RwLock::new(HashMap::new()),
        }
    }

    /// Allocate a fresh actor name with the given prefix
    pub fn alloc_id(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    /// Register a live actor under its own name
    pub fn register(&self, actor: ActorRef) {
        let name = actor.name().to_string();
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name, Slot::Ready(actor));
    }

    /// Register a deferred actor, constructed on first lookup
    pub fn register_deferred(&self, name: &str, ctor: DeferredCtor) {
        self.slots
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), Slot::Deferred(ctor));
    }

    /// Resolve an actor by name, promoting a deferred slot if this is its
    /// first access
    pub fn get(&self, name: &str) -> Option<ActorRef> {
        {
            let slots = self.slots.read().unwrap_or_else(PoisonError::into_inner);
            match slots.get(name) {
                Some(Slot::Ready(actor)) => return Some(actor.clone()),
                Some(Slot::Deferred(_)) => {}
                None => return None,
            }
        }

        let mut slots = self.slots.write().unwrap_or_else(PoisonError::into_inner);
        match slots.remove(name) {
            Some(Slot::Deferred(ctor)) => {
                let actor = ctor();
                slots.insert(name.to_string(), Slot::Ready(actor.clone()));
                Some(actor)
            }
            // Promoted by a racing lookup between our two lock acquisitions.
            Some(Slot::Ready(actor)) => {
                let resolved = actor.clone();
                slots.insert(name.to_string(), Slot::Ready(actor));
                Some(resolved)
            }
            None => None,
        }
    }
}

impl Default for ActorRegistry {
    fn default() -> Self {
        Self::new()
    }
}
