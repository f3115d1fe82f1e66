//! CDP type definitions
//!
//! Wire types for communication with the debugging target, plus the tab
//! descriptors its discovery endpoint reports.

use serde::{Deserialize, Serialize};

/// CDP JSON-RPC request
#[derive(Debug, Clone, Serialize)]
pub struct CdpRequest {
    /// Request ID, unique per connection
    pub id: u64,
    /// Method name (e.g., "Page.enable")
    pub method: String,
    /// Method parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<serde_json::Value>,
}

/// CDP JSON-RPC response
#[derive(Debug, Clone, Deserialize)]
pub struct CdpResponse {
    /// Response ID (matches request ID)
    pub id: u64,
    /// Response result
    #[serde(default)]
    pub result: serde_json::Value,
    /// Error if any
    #[serde(default)]
    pub error: Option<CdpErrorDetail>,
}

/// CDP error detail
#[derive(Debug, Clone, Deserialize)]
pub struct CdpErrorDetail {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// CDP JSON-RPC notification (unsolicited event)
#[derive(Debug, Clone, Deserialize)]
pub struct CdpNotification {
    /// Event method (e.g., "Page.frameNavigated")
    pub method: String,
    /// Event parameters
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Tab descriptor reported by the target's discovery endpoint
///
/// The target is the source of truth for these fields; the bridge only
/// mirrors them. Entries without a `webSocketDebuggerUrl` are not
/// attachable (background pages, service workers).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabDescriptor {
    /// Target-assigned identifier, stable for the tab's lifetime
    pub id: String,
    /// Declared target type ("page", "background_page", ...)
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Tab title
    #[serde(default)]
    pub title: String,
    /// Tab URL
    #[serde(default)]
    pub url: String,
    /// Live debugging endpoint, when the tab exposes one
    #[serde(
        rename = "webSocketDebuggerUrl",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub web_socket_debugger_url: Option<String>,
}

/// One frame in a tab's frame tree
#[derive(Debug, Clone, Deserialize)]
pub struct Frame {
    /// Frame identifier
    pub id: String,
    /// Document URL
    #[serde(default)]
    pub url: String,
    /// Parent frame identifier; absent for the root frame
    #[serde(rename = "parentId", default)]
    pub parent_id: Option<String>,
}

/// Frame tree node returned by Page.getResourceTree
#[derive(Debug, Clone, Deserialize)]
pub struct FrameTree {
    /// The frame this node describes
    pub frame: Frame,
}

/// Result of Page.getResourceTree
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceTree {
    /// Root of the frame tree
    #[serde(rename = "frameTree")]
    pub frame_tree: FrameTree,
}

/// Params of a Page.frameStartedLoading notification
#[derive(Debug, Clone, Deserialize)]
pub struct FrameStartedLoading {
    /// Frame that started loading
    #[serde(rename = "frameId")]
    pub frame_id: String,
}

/// Params of a Page.frameNavigated notification
#[derive(Debug, Clone, Deserialize)]
pub struct FrameNavigated {
    /// Frame that finished navigating
    pub frame: Frame,
}
