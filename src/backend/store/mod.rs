//! Persistence Module
//!
//! This module defines the storage contract the chat core relies on and the
//! two implementations shipped with the server.
//!
//! # Module Structure
//!
//! ```text
//! store/
//! ├── mod.rs      - ChatStore trait and FriendPair
//! ├── locks.rs    - Per-entity async locks
//! ├── memory.rs   - In-process store (development, tests)
//! └── postgres.rs - PostgreSQL store (sqlx)
//! ```
//!
//! # Atomicity
//!
//! Each `ChatStore` call is atomic on its own: `resolve_friend_request`
//! flips the request and records the friendship in one commit, and
//! `save_group` rewrites a group's name, owner and members in one commit.
//! Read-modify-write sequences spanning several calls are serialised by the
//! managers through `KeyedLocks`, scoped to one friend pair or one group.

use async_trait::async_trait;
use std::collections::BTreeSet;

use crate::backend::error::StoreError;
use crate::shared::messaging::{
    DirectDraft, DirectMessage, FriendRequest, FriendRequestStatus, Group, GroupDraft, GroupMessage,
};

/// In-process store
pub mod memory;

/// PostgreSQL store
pub mod postgres;

/// Per-entity async locks
pub mod locks;

pub use locks::KeyedLocks;
pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Unordered pair of usernames, stored in canonical (sorted) order
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FriendPair(String, String);

impl FriendPair {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }

    pub fn first(&self) -> &str {
        &self.0
    }

    pub fn second(&self) -> &str {
        &self.1
    }

    pub fn contains(&self, username: &str) -> bool {
        self.0 == username || self.1 == username
    }

    /// The member of the pair that is not `username`
    pub fn other(&self, username: &str) -> Option<&str> {
        if self.0 == username {
            Some(&self.1)
        } else if self.1 == username {
            Some(&self.0)
        } else {
            None
        }
    }
}

/// Storage backend for users, the friend graph, groups and messages
#[async_trait]
pub trait ChatStore: Send + Sync + 'static {
    /// Record a verified identity in the user directory
    async fn ensure_user(&self, username: &str) -> StoreResult<()>;

    async fn user_exists(&self, username: &str) -> StoreResult<bool>;

    /// Pending request from `sender` to `receiver` (direction-sensitive)
    async fn find_pending_request(
        &self,
        sender: &str,
        receiver: &str,
    ) -> StoreResult<Option<FriendRequest>>;

    async fn insert_friend_request(&self, sender: &str, receiver: &str) -> StoreResult<FriendRequest>;

    /// Move a pending request to `status`; accepting also records the
    /// friendship in the same commit. Returns `None` if the request was no
    /// longer pending.
    async fn resolve_friend_request(
        &self,
        request_id: i64,
        status: FriendRequestStatus,
    ) -> StoreResult<Option<FriendRequest>>;

    /// Pending requests addressed to `receiver`, newest first
    async fn pending_requests_for(&self, receiver: &str) -> StoreResult<Vec<FriendRequest>>;

    async fn are_friends(&self, a: &str, b: &str) -> StoreResult<bool>;

    /// Returns whether a friendship existed
    async fn remove_friendship(&self, a: &str, b: &str) -> StoreResult<bool>;

    /// Friends of `username`, sorted
    async fn friends_of(&self, username: &str) -> StoreResult<Vec<String>>;

    async fn insert_group(
        &self,
        name: &str,
        owner: &str,
        members: &BTreeSet<String>,
    ) -> StoreResult<Group>;

    async fn get_group(&self, group_id: i64) -> StoreResult<Option<Group>>;

    /// Overwrite name, owner and member set of an existing group
    async fn save_group(&self, group: &Group) -> StoreResult<()>;

    /// Returns whether the group existed
    async fn delete_group(&self, group_id: i64) -> StoreResult<bool>;

    /// Groups `username` belongs to, by id
    async fn groups_for(&self, username: &str) -> StoreResult<Vec<Group>>;

    /// Append a direct message; assigns id and server timestamp
    async fn append_direct(&self, draft: &DirectDraft) -> StoreResult<DirectMessage>;

    /// Append a group message; assigns id and server timestamp
    async fn append_group(&self, draft: &GroupDraft) -> StoreResult<GroupMessage>;

    /// Conversation between `a` and `b`, oldest first
    async fn direct_history(&self, a: &str, b: &str) -> StoreResult<Vec<DirectMessage>>;

    /// Messages of a group, oldest first
    async fn group_history(&self, group_id: i64) -> StoreResult<Vec<GroupMessage>>;

    /// Latest message per conversation partner of `username`, newest first
    async fn recent_direct(&self, username: &str) -> StoreResult<Vec<DirectMessage>>;
}

/// Keep the newest message per partner and order the result newest first
pub(crate) fn latest_per_partner(username: &str, messages: Vec<DirectMessage>) -> Vec<DirectMessage> {
    let mut latest: std::collections::HashMap<String, DirectMessage> = std::collections::HashMap::new();
    for message in messages {
        let partner = message.partner_of(username).to_string();
        match latest.get(&partner) {
            Some(existing) if (existing.timestamp, existing.id) >= (message.timestamp, message.id) => {}
            _ => {
                latest.insert(partner, message);
            }
        }
    }
    let mut result: Vec<DirectMessage> = latest.into_values().collect();
    result.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
    result
}
