//! CDP WebSocket connection implementation
//!
//! One persistent WebSocket per debugging target. Requests are correlated to
//! responses by id through a pending map of oneshot senders; notifications
//! fan out to registered handlers on the read task, preserving arrival order.

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::{oneshot, Mutex, OnceCell};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

use super::traits::{CdpConnection, EventHandler};
use super::types::{CdpNotification, CdpRequest, CdpResponse};
use crate::error::{Error, Result};

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsStream = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

type PendingMap = Arc<Mutex<HashMap<u64, oneshot::Sender<CdpResponse>>>>;
type HandlerMap = Arc<std::sync::Mutex<HashMap<String, Vec<EventHandler>>>>;

/// CDP connection over a WebSocket
pub struct CdpWebSocketConnection {
    /// WebSocket URL of the target
    url: String,
    /// Next request ID
    next_id: AtomicU64,
    /// Requests awaiting their response, keyed by request ID
    pending: PendingMap,
    /// Notification handlers, in registration order per event name
    handlers: HandlerMap,
    /// Write half, shared between request senders and the pong reply
    sink: Arc<Mutex<WsSink>>,
    /// Cleared when the transport goes away
    active: Arc<AtomicBool>,
}

impl fmt::Debug for CdpWebSocketConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CdpWebSocketConnection")
            .field("url", &self.url)
            .field("active", &self.is_active())
            .finish()
    }
}

impl CdpWebSocketConnection {
    /// Connect to a target's debugging endpoint
    ///
    /// # Arguments
    /// * `url` - WebSocket URL (e.g., "ws://localhost:9222/devtools/page/ABC123")
    pub async fn connect(url: &str) -> Result<Arc<Self>> {
        debug!("connecting to target at {}", url);

        let (ws_stream, _) = connect_async(url)
            .await
            .map_err(|e| Error::websocket(format!("failed to connect to {}: {}", url, e)))?;
        let (sink, stream) = ws_stream.split();

        let connection = Arc::new(Self {
            url: url.to_string(),
            next_id: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
            handlers: Arc::new(std::sync::Mutex::new(HashMap::new())),
            sink: Arc::new(Mutex::new(sink)),
            active: Arc::new(AtomicBool::new(true)),
        });

        tokio::spawn(Self::read_loop(
            stream,
            Arc::clone(&connection.pending),
            Arc::clone(&connection.handlers),
            Arc::clone(&connection.sink),
            Arc::clone(&connection.active),
        ));

        Ok(connection)
    }

    /// Read messages off the transport until it goes away
    async fn read_loop(
        mut stream: WsStream,
        pending: PendingMap,
        handlers: HandlerMap,
        sink: Arc<Mutex<WsSink>>,
        active: Arc<AtomicBool>,
    ) {
        while let Some(message) = stream.next().await {
            match message {
                Ok(Message::Text(text)) => Self::dispatch(&text, &pending, &handlers).await,
                Ok(Message::Ping(payload)) => {
                    let mut sink = sink.lock().await;
                    if sink.send(Message::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Ok(Message::Close(_)) => {
                    debug!("target closed the connection");
                    break;
                }
                Err(e) => {
                    warn!("WebSocket error: {}", e);
                    break;
                }
                _ => {}
            }
        }

        active.store(false, Ordering::SeqCst);

        // Dropping the senders of every request still in flight makes their
        // callers observe TransportClosed. Requests that already resolved are
        // unaffected.
        pending.lock().await.clear();
    }

    /// Route one inbound frame to its pending request or its event handlers
    async fn dispatch(text: &str, pending: &PendingMap, handlers: &HandlerMap) {
        // Responses carry an id, notifications a method; try response first.
        if let Ok(response) = serde_json::from_str::<CdpResponse>(text) {
            match pending.lock().await.remove(&response.id) {
                Some(tx) => {
                    let _ = tx.send(response);
                }
                None => warn!("response for unknown request id {}", response.id),
            }
            return;
        }

        if let Ok(notification) = serde_json::from_str::<CdpNotification>(text) {
            // Clone the handler list so a handler may register further
            // handlers without deadlocking on the map.
            let matching: Vec<EventHandler> = handlers
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .get(&notification.method)
                .cloned()
                .unwrap_or_default();
            for handler in matching {
                handler(&notification.params);
            }
            return;
        }

        debug!("ignoring unrecognized frame from target: {}", text);
    }
}

#[async_trait::async_trait]
impl CdpConnection for CdpWebSocketConnection {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        if !self.is_active() {
            return Err(Error::TransportClosed);
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let request = CdpRequest {
            id,
            method: method.to_string(),
            params: if params.is_null() { None } else { Some(params) },
        };
        let json = serde_json::to_string(&request)?;

        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id, tx);

        debug!("sending command {} {}", id, method);
        {
            let mut sink = self.sink.lock().await;
            if let Err(e) = sink.send(Message::Text(json)).await {
                self.pending.lock().await.remove(&id);
                return Err(Error::websocket(format!("failed to send {}: {}", method, e)));
            }
        }

        // The read loop may have torn down between the active check and the
        // insert; a sender parked in that window would never be resolved or
        // dropped, so reap it here.
        if !self.is_active() && self.pending.lock().await.remove(&id).is_some() {
            return Err(Error::TransportClosed);
        }

        let response = rx.await.map_err(|_| Error::TransportClosed)?;

        if let Some(error) = response.error {
            return Err(Error::rpc(error.code, error.message));
        }

        Ok(response.result)
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
        self.active.load(Ordering::SeqCst)
    }

    async fn close(&self) -> Result<()> {
        self.active.store(false, Ordering::SeqCst);
        let mut sink = self.sink.lock().await;
        sink.close()
            .await
            .map_err(|e| Error::websocket(format!("failed to close: {}", e)))?;
        Ok(())
    }
}

/// Connection wrapper that dials on first use
///
/// Tab actors are constructed during tab enumeration, which must not perform
/// I/O. The wrapper records handler registrations made before the socket
/// exists and replays them, in order, once the first request dials it.
pub struct LazyCdpConnection {
    url: String,
    cell: OnceCell<Arc<CdpWebSocketConnection>>,
    early: std::sync::Mutex<Vec<(String, EventHandler)>>,
}

impl fmt::Debug for LazyCdpConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyCdpConnection")
            .field("url", &self.url)
            .field("dialed", &self.cell.initialized())
            .finish()
    }
}

impl LazyCdpConnection {
    /// Wrap a target WebSocket URL without dialing it
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            cell: OnceCell::new(),
            early: std::sync::Mutex::new(Vec::new()),
        }
    }

    async fn connected(&self) -> Result<&Arc<CdpWebSocketConnection>> {
        let connection = self
            .cell
            .get_or_try_init(|| async { CdpWebSocketConnection::connect(&self.url).await })
            .await?;

        let buffered: Vec<(String, EventHandler)> = self
            .early
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .drain(..)
            .collect();
        for (event, handler) in buffered {
            connection.on(&event, handler);
        }

        Ok(connection)
    }
}

#[async_trait::async_trait]
impl CdpConnection for LazyCdpConnection {
    async fn request(&self, method: &str, params: Value) -> Result<Value> {
        self.connected().await?.request(method, params).await
    }

    fn on(&self, event: &str, handler: EventHandler) {
        let mut early = self
            .early
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        // Forward directly only once every buffered registration has been
        // replayed, so registration order survives the dial.
        if early.is_empty() {
            if let Some(connection) = self.cell.get() {
                connection.on(event, handler);
                return;
            }
        }
        early.push((event.to_string(), handler));
    }

    fn is_active(&self) -> bool {
        // Not dialed yet still counts as usable.
        self.cell.get().map(|c| c.is_active()).unwrap_or(true)
    }

    async fn close(&self) -> Result<()> {
        match self.cell.get() {
            Some(connection) => connection.close().await,
            None => Ok(()),
        }
    }
}
