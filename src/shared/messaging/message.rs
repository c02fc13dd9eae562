//! Chat Message Data Structures
//!
//! Direct and group messages are immutable once persisted. Drafts carry what
//! the sender supplied; the store assigns the id and the server timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// Reserved sender name for messages generated by group state changes
pub const SYSTEM_SENDER: &str = "SYSTEM";

/// Upper bound on message content, in characters
pub const MAX_CONTENT_CHARS: usize = 4000;

/// A persisted direct message
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DirectMessage {
    pub id: i64,
    pub sender: String,
    pub receiver: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl DirectMessage {
    /// The other party of the conversation, seen from `username`
    pub fn partner_of(&self, username: &str) -> &str {
        if self.sender == username {
            &self.receiver
        } else {
            &self.sender
        }
    }
}

/// A persisted group message (user-authored or SYSTEM)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroupMessage {
    pub id: i64,
    pub group_id: i64,
    pub sender: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl GroupMessage {
    pub fn is_system(&self) -> bool {
        self.sender == SYSTEM_SENDER
    }
}

/// Direct message before persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectDraft {
    pub sender: String,
    pub receiver: String,
    pub content: String,
}

/// Group message before persistence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDraft {
    pub group_id: i64,
    pub sender: String,
    pub content: String,
}

impl GroupDraft {
    /// Notice emitted on a group state transition
    pub fn system(group_id: i64, content: impl Into<String>) -> Self {
        Self {
            group_id,
            sender: SYSTEM_SENDER.to_string(),
            content: content.into(),
        }
    }
}

/// Check user-supplied content before it reaches any authorization decision
pub fn validate_content(content: &str) -> Result<(), SharedError> {
    if content.trim().is_empty() {
        return Err(SharedError::validation("content", "Message content cannot be empty"));
    }
    if content.chars().count() > MAX_CONTENT_CHARS {
        return Err(SharedError::validation(
            "content",
            format!("Message content exceeds {} characters", MAX_CONTENT_CHARS),
        ));
    }
    Ok(())
}

/// Response for direct message history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectHistoryResponse {
    pub messages: Vec<DirectMessage>,
}

/// Response for the caller's recent conversations, newest first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentConversationsResponse {
    pub conversations: Vec<DirectMessage>,
}

/// Response for group message history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupHistoryResponse {
    pub group_id: i64,
    pub messages: Vec<GroupMessage>,
}
