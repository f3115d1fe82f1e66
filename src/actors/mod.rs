//! Actor layer
//!
//! The client protocol addresses named actors. One root actor per client
//! connection owns the tab directory; each discovered tab gets a long-lived
//! tab actor that owns the RPC connection to that tab and translates its
//! frame events; every tab actor advertises a lazily-built console actor.
//!
//! Module structure:
//! - `registry`: actor naming, dispatch trait, deferred construction slots
//! - `root`: discovery handshake and tab directory
//! - `tab`: per-tab session state and event translation
//! - `console`: minimal console endpoint

pub mod registry;
pub mod root;
pub mod tab;
pub mod console;

pub use registry::{Actor, ActorRef, ActorRegistry};
pub use root::{ConnectionFactory, RootActor};
pub use tab::TabActor;
pub use console::ConsoleActor;

/// Outbound packet channel for one client connection
///
/// Everything a client receives, replies and events alike, funnels through
/// this sender, so packets never interleave on the wire.
pub type ClientSink = tokio::sync::mpsc::UnboundedSender<serde_json::Value>;
