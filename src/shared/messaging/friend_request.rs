//! Friend Request Data Structure
//!
//! Represents directional friend proposals between users. A request starts
//! out `Pending` and ends in exactly one terminal state; terminal records are
//! never reopened, so a later proposal between the same pair is a new record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of a friend request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FriendRequestStatus {
    /// Request is waiting for the receiver
    #[default]
    Pending,
    /// Request was accepted and a friendship exists
    Accepted,
    /// Request was rejected
    Rejected,
}

impl FriendRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendRequestStatus::Pending => "pending",
            FriendRequestStatus::Accepted => "accepted",
            FriendRequestStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(FriendRequestStatus::Pending),
            "accepted" => Some(FriendRequestStatus::Accepted),
            "rejected" => Some(FriendRequestStatus::Rejected),
            _ => None,
        }
    }

    /// Accepted and rejected requests are never revisited
    pub fn is_terminal(&self) -> bool {
        !matches!(self, FriendRequestStatus::Pending)
    }
}

/// Represents a friend request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FriendRequest {
    /// Unique request ID
    pub id: i64,
    /// Username of the user who sent the request
    pub sender: String,
    /// Username of the user who received the request
    pub receiver: String,
    /// Current status of the request
    #[serde(default)]
    pub status: FriendRequestStatus,
    /// When the request was created
    pub created_at: DateTime<Utc>,
    /// When the request was accepted or rejected
    pub responded_at: Option<DateTime<Utc>>,
}

impl FriendRequest {
    /// Check if the request is pending
    pub fn is_pending(&self) -> bool {
        self.status == FriendRequestStatus::Pending
    }
}

/// Request to send a friend request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendFriendRequestRequest {
    /// Username of the user to send the request to
    pub receiver: String,
}

/// Request to accept or reject a pending friend request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RespondFriendRequestRequest {
    /// Username of the user who sent the pending request
    pub sender: String,
}

/// Response for listing friend requests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFriendRequestsResponse {
    pub requests: Vec<FriendRequest>,
}

/// Response for listing friends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListFriendsResponse {
    pub friends: Vec<String>,
}
