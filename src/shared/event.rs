/**
 * Real-time Wire Frames
 *
 * This module defines the JSON frames exchanged over the WebSocket
 * connection. Both directions are internally tagged by a `type` field in
 * snake_case, for example:
 *
 * ```json
 * {"type": "direct_message", "receiver": "bob", "content": "hi"}
 * ```
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::messaging::{DirectMessage, GroupMessage};

/// Frame sent by a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    /// Connection-open frame carrying the bearer credential
    Connect { token: String },
    /// Send a direct message to a friend
    DirectMessage { receiver: String, content: String },
    /// Send a message to a group the sender belongs to
    GroupMessage { group_id: i64, content: String },
    /// Start receiving a group's channel
    Subscribe { group_id: i64 },
    /// Stop receiving a group's channel
    Unsubscribe { group_id: i64 },
    /// Liveness probe
    Ping,
}

impl ClientFrame {
    /// Parse a text frame
    pub fn parse(text: &str) -> Result<Self, SharedError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Frame name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            ClientFrame::Connect { .. } => "connect",
            ClientFrame::DirectMessage { .. } => "direct_message",
            ClientFrame::GroupMessage { .. } => "group_message",
            ClientFrame::Subscribe { .. } => "subscribe",
            ClientFrame::Unsubscribe { .. } => "unsubscribe",
            ClientFrame::Ping => "ping",
        }
    }
}

/// Error codes carried by `ServerEvent::Error`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Credential missing or invalid; the connection is closing
    Unauthorized,
    /// Frame could not be parsed
    BadFrame,
    /// Field validation failed
    Invalid,
    /// Subscription to a channel the caller may not read
    Forbidden,
    /// Persistence backend failure
    Unavailable,
}

/// Frame sent by the server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Handshake accepted
    Connected { username: String },
    /// Delivery on a personal channel
    DirectMessage(DirectMessage),
    /// Delivery on a group channel (includes SYSTEM notices)
    GroupMessage(GroupMessage),
    /// Request-level failure
    Error { code: ErrorCode, message: String },
    /// Reply to `ping`
    Pong,
}

impl ServerEvent {
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            code,
            message: message.into(),
        }
    }

    /// Serialize to a text frame
    pub fn to_text(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
