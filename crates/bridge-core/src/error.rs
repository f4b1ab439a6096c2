//! Error types for the web bridge

use thiserror::Error;

/// Result type for bridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Bridge error types
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Invalid configuration (bad scheme, unreadable config file)
    #[error("Config error: {0}")]
    Config(String),

    /// Connect attempt failed (timeout, refused, handshake)
    #[error("Connect failed: {0}")]
    Connect(String),

    /// Operation requires an open connection
    #[error("Not connected")]
    NotConnected,

    /// Send on an open connection failed
    #[error("Send failed: {0}")]
    Send(String),

    /// Malformed wire message
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Filesystem or channel error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<serde_json::Error> for BridgeError {
    fn from(err: serde_json::Error) -> Self {
        BridgeError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for BridgeError {
    fn from(err: std::io::Error) -> Self {
        BridgeError::Io(err.to_string())
    }
}
