//! Unified error types for Devtools-Bridge

use thiserror::Error;

/// Unified Result type
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Devtools-Bridge
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket errors
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Transport failed while a request was outstanding
    #[error("transport closed before a response arrived")]
    TransportClosed,

    /// Error reported by the target for a command
    #[error("target RPC error {code}: {message}")]
    Rpc { code: i32, message: String },

    /// Tab discovery endpoint unreachable or malformed
    #[error("discovery unavailable: {0}")]
    DiscoveryUnavailable(String),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No actor registered under the requested name
    #[error("no such actor: {0}")]
    ActorNotFound(String),

    /// Request type the addressed actor does not implement
    #[error("actor {actor} does not recognize packet type {packet_type}")]
    UnrecognizedPacket { actor: String, packet_type: String },

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new WebSocket error
    pub fn websocket<S: Into<String>>(msg: S) -> Self {
        Error::WebSocket(msg.into())
    }

    /// Create a new target RPC error
    pub fn rpc<S: Into<String>>(code: i32, message: S) -> Self {
        Error::Rpc {
            code,
            message: message.into(),
        }
    }

    /// Create a new discovery error
    pub fn discovery_unavailable<S: Into<String>>(msg: S) -> Self {
        Error::DiscoveryUnavailable(msg.into())
    }

    /// Create a new actor not found error
    pub fn actor_not_found<S: Into<String>>(name: S) -> Self {
        Error::ActorNotFound(name.into())
    }

    /// Create a new unrecognized packet error
    pub fn unrecognized_packet<A: Into<String>, T: Into<String>>(actor: A, packet_type: T) -> Self {
        Error::UnrecognizedPacket {
            actor: actor.into(),
            packet_type: packet_type.into(),
        }
    }

    /// Create a new configuration error
    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        Error::Configuration(msg.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }
}
