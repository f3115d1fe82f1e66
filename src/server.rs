//! Client-facing bridge server
//!
//! Accepts debugger clients over TCP. Each client connection gets its own
//! actor registry and root actor; inbound packets are dispatched to actors
//! by name and every outbound packet, reply or event, funnels through one
//! writer task so frames never interleave.

use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::actors::registry::{Actor, ActorRef, ActorRegistry};
use crate::actors::root::{ConnectionFactory, RootActor};
use crate::actors::ClientSink;
use crate::cdp::connection::LazyCdpConnection;
use crate::cdp::traits::CdpConnection;
use crate::cdp::types::TabDescriptor;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::protocol::packet;

/// The bridge server
pub struct BridgeServer {
    config: Config,
}

impl BridgeServer {
    /// Create a server from its configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Bind the listen address and serve clients until the task is dropped
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = TcpListener::bind(&addr).await?;

        info!(
            "bridge listening on {}, target at {}",
            addr, self.config.target_url
        );

        serve(listener, self.config.target_url).await
    }
}

/// Accept loop over an already-bound listener
pub async fn serve(listener: TcpListener, target_url: String) -> Result<()> {
    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("client connected from {}", peer);

        let target_url = target_url.clone();
        tokio::spawn(handle_client(stream, target_url));
    }
}

/// Drive one client connection to completion
pub async fn handle_client(stream: TcpStream, target_url: String) {
    let session = Uuid::new_v4();
    info!("client session {} started", session);

    let (read_half, mut write_half) = stream.into_split();
    let (sink, mut outbound) = mpsc::unbounded_channel::<Value>();

    let writer = tokio::spawn(async move {
        while let Some(outgoing) = outbound.recv().await {
            if let Err(e) = packet::write_packet(&mut write_half, &outgoing).await {
                debug!("client write failed: {}", e);
                break;
            }
        }
    });

    let registry = Arc::new(ActorRegistry::new());
    let connect: ConnectionFactory = Arc::new(|descriptor: &TabDescriptor| {
        let url = descriptor
            .web_socket_debugger_url
            .clone()
            .unwrap_or_default();
        Arc::new(LazyCdpConnection::new(url)) as Arc<dyn CdpConnection>
    });
    let root = RootActor::new(Arc::clone(&registry), sink.clone(), target_url, connect);
    root.say_hello();

    let mut reader = BufReader::new(read_half);
    loop {
        match packet::read_packet(&mut reader).await {
            Ok(Some(request)) => dispatch(&root, &registry, &sink, request).await,
            Ok(None) => break,
            Err(e) => {
                warn!("client session {}: bad packet: {}", session, e);
                break;
            }
        }
    }

    // Tab actors hold sink clones for event emission, so the channel never
    // drains on its own; the client is gone, stop writing outright.
    drop(sink);
    writer.abort();
    info!("client session {} ended", session);
}

/// Route one request packet to the actor it addresses and send the reply
async fn dispatch(root: &Arc<RootActor>, registry: &ActorRegistry, sink: &ClientSink, request: Value) {
    let Some(to) = request.get("to").and_then(Value::as_str).map(str::to_string) else {
        warn!("dropping request without a destination actor: {}", request);
        return;
    };
    let packet_type = request
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    // The root actor is addressed by its well-known name; everything else
    // lives in the registry.
    let resolved = if to == root.name() {
        Some(Arc::clone(root) as ActorRef)
    } else {
        registry.get(&to)
    };

    let reply = match resolved {
        None => error_reply(&to, &Error::actor_not_found(&to)),
        Some(actor) => match actor.handle(&packet_type, &request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("actor {} failed to handle {}: {}", to, packet_type, e);
                error_reply(&to, &e)
            }
        },
    };

    if sink.send(reply).is_err() {
        debug!("client gone, dropping reply from {}", to);
    }
}

/// Error packet reported back to the requesting client
fn error_reply(actor: &str, error: &Error) -> Value {
    json!({
        "from": actor,
        "error": error_code(error),
        "message": error.to_string(),
    })
}

/// Client-protocol error name for a failure
fn error_code(error: &Error) -> &'static str {
    match error {
        Error::UnrecognizedPacket { .. } => "unrecognizedPacketType",
        Error::ActorNotFound(_) => "noSuchActor",
        Error::DiscoveryUnavailable(_) => "unavailable",
        Error::TransportClosed => "connectionClosed",
        _ => "unknownError",
    }
}
