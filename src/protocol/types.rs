//! Message shapes for the client protocol

use serde::{Deserialize, Serialize};

/// Name of the root actor on every client connection
pub const ROOT_ACTOR: &str = "root";

/// Capability flags advertised in the hello announcement
///
/// The bridge translates tab discovery, attach/detach, and navigation events
/// only, so every flag is false.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RootTraits {
    pub sources: bool,
    #[serde(rename = "editOuterHTML")]
    pub edit_outer_html: bool,
    pub highlightable: bool,
    #[serde(rename = "urlToImageDataResolver")]
    pub url_to_image_data_resolver: bool,
    #[serde(rename = "networkMonitor")]
    pub network_monitor: bool,
    #[serde(rename = "storageInspector")]
    pub storage_inspector: bool,
    #[serde(rename = "storageInspectorReadOnly")]
    pub storage_inspector_read_only: bool,
    #[serde(rename = "conditionalBreakpoints")]
    pub conditional_breakpoints: bool,
}

/// One-time capability announcement sent when a client connects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloPacket {
    pub from: String,
    #[serde(rename = "applicationType")]
    pub application_type: String,
    pub traits: RootTraits,
}

impl HelloPacket {
    pub fn new() -> Self {
        Self {
            from: ROOT_ACTOR.to_string(),
            application_type: "browser".to_string(),
            traits: RootTraits::default(),
        }
    }
}

impl Default for HelloPacket {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialized projection of one tab actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabForm {
    pub actor: String,
    pub title: String,
    pub url: String,
    #[serde(rename = "consoleActor")]
    pub console_actor: String,
}

/// Reply to a listTabs request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabListReply {
    pub from: String,
    pub tabs: Vec<TabForm>,
    /// Index of the first "page" tab; omitted when none qualifies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
}

/// Normalized navigation event emitted by a tab actor
///
/// Two target-side notifications fold into this single two-phase event: the
/// "start" phase carries the URL being left, the "stop" phase the URL
/// arrived at.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabNavigatedEvent {
    pub from: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub state: String,
    #[serde(rename = "nativeConsoleAPI")]
    pub native_console_api: bool,
}

impl TabNavigatedEvent {
    pub fn new<A: Into<String>, U: Into<String>, S: Into<String>>(
        actor: A,
        url: U,
        state: S,
    ) -> Self {
        Self {
            from: actor.into(),
            kind: "tabNavigated".to_string(),
            url: url.into(),
            state: state.into(),
            native_console_api: true,
        }
    }
}
