//! Error types shared across the crate.
//!
//! Channel errors are expected in normal operation (tabs close and navigate
//! mid-conversation); callers match on them and carry on.

use thiserror::Error;

use super::tab::TabId;

// === ChannelError ===

/// A message could not be delivered or its reply could not be read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The target tab no longer exists.
    #[error("tab {0} is closed")]
    TabClosed(TabId),
    /// The tab exists but nothing in it is listening.
    #[error("no receiving end in tab {0}")]
    NoReceiver(TabId),
    /// The other side of the channel went away.
    #[error("channel disconnected: {0}")]
    Disconnected(String),
    /// A reply arrived but does not have the expected shape.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

// === SettingsError ===

/// Errors from the settings persistence layer.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("settings serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// === ConfigError ===

/// Errors while loading the static configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid match pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

// === DispatchError ===

/// Errors turning a raw JSON message into a handler call.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("malformed message: {0}")]
    MalformedMessage(#[from] serde_json::Error),
    /// Tab-scoped messages must arrive with a channel-supplied sender tab.
    #[error("message '{0}' requires a sender tab")]
    MissingSender(&'static str),
}

// === BridgeError ===

/// Errors on the stdio host protocol.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("bridge io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bridge protocol error: {0}")]
    Protocol(String),
    #[error("bridge frame error: {0}")]
    Frame(#[from] serde_json::Error),
}
