//! Mock debugging target for integration tests
//!
//! A stand-in for a Chromium-style target: an HTTP endpoint listing tabs at
//! `/json`, plus one scripted WebSocket responder per attached tab that can
//! push frame-lifecycle notifications.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{accept_async, tungstenite::Message};

/// Specification of one tab the mock target reports
#[derive(Clone)]
pub struct TabSpec {
    pub id: &'static str,
    pub kind: &'static str,
    pub title: &'static str,
    pub url: &'static str,
    /// Whether the descriptor carries a webSocketDebuggerUrl
    pub debuggable: bool,
}

/// Mock debugging target
pub struct MockTarget {
    base_url: String,
}

impl MockTarget {
    /// Start a target reporting the given tabs
    pub async fn start(tabs: Vec<TabSpec>) -> Self {
        // WebSocket side: every accepted connection speaks the scripted
        // Page domain below.
        let ws_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let ws_addr = ws_listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((stream, _)) = ws_listener.accept().await {
                tokio::spawn(handle_tab_connection(stream));
            }
        });

        // HTTP side: serve the /json tab list.
        let http_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let http_addr = http_listener.local_addr().unwrap();
        let body =
            serde_json::to_string(&descriptors(&tabs, &format!("ws://{}", ws_addr))).unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = http_listener.accept().await {
                let body = body.clone();
                tokio::spawn(async move {
                    let mut request = [0u8; 1024];
                    let _ = stream.read(&mut request).await;

                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                        body.len(),
                        body
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", http_addr),
        }
    }

    /// Discovery base URL of this target
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn descriptors(tabs: &[TabSpec], ws_base: &str) -> Vec<Value> {
    tabs.iter()
        .map(|tab| {
            let mut descriptor = json!({
                "id": tab.id,
                "type": tab.kind,
                "title": tab.title,
                "url": tab.url,
            });
            if tab.debuggable {
                descriptor["webSocketDebuggerUrl"] =
                    json!(format!("{}/devtools/page/{}", ws_base, tab.id));
            }
            descriptor
        })
        .collect()
}

/// Scripted Page domain for one attached tab
///
/// Page.enable answers, then pushes a top-level start/navigate pair plus a
/// subordinate-frame pair the bridge must filter out.
async fn handle_tab_connection(stream: TcpStream) {
    let Ok(mut ws) = accept_async(stream).await else {
        return;
    };

    while let Some(Ok(message)) = ws.next().await {
        let Message::Text(text) = message else { continue };
        let request: Value = serde_json::from_str(&text).unwrap();
        let id = request["id"].as_u64().unwrap();
        let method = request["method"].as_str().unwrap_or("");

        match method {
            "Page.getResourceTree" => {
                let reply = json!({
                    "id": id,
                    "result": {
                        "frameTree": {
                            "frame": {"id": "frame-1", "url": "http://old.example/"}
                        }
                    }
                });
                let _ = ws.send(Message::Text(reply.to_string())).await;
            }
            "Page.enable" => {
                let reply = json!({"id": id, "result": {}});
                let _ = ws.send(Message::Text(reply.to_string())).await;

                for event in navigation_script() {
                    let _ = ws.send(Message::Text(event.to_string())).await;
                }
            }
            "Page.disable" => {
                let reply = json!({"id": id, "result": {}});
                let _ = ws.send(Message::Text(reply.to_string())).await;
            }
            _ => {
                let reply = json!({
                    "id": id,
                    "error": {
                        "code": -32601,
                        "message": format!("Method not implemented: {}", method)
                    }
                });
                let _ = ws.send(Message::Text(reply.to_string())).await;
            }
        }
    }
}

fn navigation_script() -> Vec<Value> {
    vec![
        json!({"method": "Page.frameStartedLoading", "params": {"frameId": "frame-1"}}),
        json!({"method": "Page.frameStartedLoading", "params": {"frameId": "frame-sub"}}),
        json!({
            "method": "Page.frameNavigated",
            "params": {
                "frame": {"id": "frame-sub", "url": "http://iframe.example/", "parentId": "frame-1"}
            }
        }),
        json!({
            "method": "Page.frameNavigated",
            "params": {"frame": {"id": "frame-1", "url": "http://new.example/"}}
        }),
    ]
}
