/**
 * In-Memory Store
 *
 * `ChatStore` backed by process memory. Used when no `DATABASE_URL` is
 * configured and throughout the test suite.
 *
 * # Layout
 *
 * - Users and friendships live in `DashSet`s; a friendship is one canonical
 *   `FriendPair` entry, so symmetry holds by construction.
 * - Friend requests and groups live in `DashMap`s keyed by id.
 * - Message logs are append-only vectors behind `tokio::sync::RwLock`.
 */
use async_trait::async_trait;
use chrono::Utc;
use dashmap::{DashMap, DashSet};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

use super::{latest_per_partner, ChatStore, FriendPair, StoreResult};
#[cfg(test)]
use crate::backend::error::StoreError;
use crate::shared::messaging::{
    DirectDraft, DirectMessage, FriendRequest, FriendRequestStatus, Group, GroupDraft, GroupMessage,
};

pub struct MemoryStore {
    users: DashSet<String>,
    requests: DashMap<i64, FriendRequest>,
    friendships: DashSet<FriendPair>,
    groups: DashMap<i64, Group>,
    direct_messages: RwLock<Vec<DirectMessage>>,
    group_messages: RwLock<Vec<GroupMessage>>,
    next_request_id: AtomicI64,
    next_group_id: AtomicI64,
    next_message_id: AtomicI64,
    #[cfg(test)]
    fail_appends: std::sync::atomic::AtomicBool,
    #[cfg(test)]
    fail_group_deletes: std::sync::atomic::AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: DashSet::new(),
            requests: DashMap::new(),
            friendships: DashSet::new(),
            groups: DashMap::new(),
            direct_messages: RwLock::new(Vec::new()),
            group_messages: RwLock::new(Vec::new()),
            next_request_id: AtomicI64::new(1),
            next_group_id: AtomicI64::new(1),
            next_message_id: AtomicI64::new(1),
            #[cfg(test)]
            fail_appends: std::sync::atomic::AtomicBool::new(false),
            #[cfg(test)]
            fail_group_deletes: std::sync::atomic::AtomicBool::new(false),
        }
    }

    /// Make every message append fail until switched back
    #[cfg(test)]
    pub(crate) fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Make every group delete fail until switched back
    #[cfg(test)]
    pub(crate) fn set_fail_group_deletes(&self, fail: bool) {
        self.fail_group_deletes.store(fail, Ordering::SeqCst);
    }

    #[cfg(test)]
    fn check_group_delete(&self) -> StoreResult<()> {
        if self.fail_group_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected delete failure".to_string()));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_group_delete(&self) -> StoreResult<()> {
        Ok(())
    }

    #[cfg(test)]
    fn check_append(&self) -> StoreResult<()> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected append failure".to_string()));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_append(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn ensure_user(&self, username: &str) -> StoreResult<()> {
        if !self.users.contains(username) {
            self.users.insert(username.to_string());
        }
        Ok(())
    }

    async fn user_exists(&self, username: &str) -> StoreResult<bool> {
        Ok(self.users.contains(username))
    }

    async fn find_pending_request(
        &self,
        sender: &str,
        receiver: &str,
    ) -> StoreResult<Option<FriendRequest>> {
        Ok(self
            .requests
            .iter()
            .find(|r| r.is_pending() && r.sender == sender && r.receiver == receiver)
            .map(|r| r.value().clone()))
    }

    async fn insert_friend_request(&self, sender: &str, receiver: &str) -> StoreResult<FriendRequest> {
        let request = FriendRequest {
            id: self.next_request_id.fetch_add(1, Ordering::SeqCst),
            sender: sender.to_string(),
            receiver: receiver.to_string(),
            status: FriendRequestStatus::Pending,
            created_at: Utc::now(),
            responded_at: None,
        };
        self.requests.insert(request.id, request.clone());
        Ok(request)
    }

    async fn resolve_friend_request(
        &self,
        request_id: i64,
        status: FriendRequestStatus,
    ) -> StoreResult<Option<FriendRequest>> {
        let Some(mut request) = self.requests.get_mut(&request_id) else {
            return Ok(None);
        };
        if !request.is_pending() {
            return Ok(None);
        }

        request.status = status;
        request.responded_at = Some(Utc::now());
        if status == FriendRequestStatus::Accepted {
            // Recorded while the request entry is still held
            self.friendships
                .insert(FriendPair::new(&request.sender, &request.receiver));
        }
        Ok(Some(request.clone()))
    }

    async fn pending_requests_for(&self, receiver: &str) -> StoreResult<Vec<FriendRequest>> {
        let mut pending: Vec<FriendRequest> = self
            .requests
            .iter()
            .filter(|r| r.is_pending() && r.receiver == receiver)
            .map(|r| r.value().clone())
            .collect();
        pending.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(pending)
    }

    async fn are_friends(&self, a: &str, b: &str) -> StoreResult<bool> {
        Ok(self.friendships.contains(&FriendPair::new(a, b)))
    }

    async fn remove_friendship(&self, a: &str, b: &str) -> StoreResult<bool> {
        Ok(self.friendships.remove(&FriendPair::new(a, b)).is_some())
    }

    async fn friends_of(&self, username: &str) -> StoreResult<Vec<String>> {
        let mut friends: Vec<String> = self
            .friendships
            .iter()
            .filter_map(|pair| pair.other(username).map(str::to_string))
            .collect();
        friends.sort();
        Ok(friends)
    }

    async fn insert_group(
        &self,
        name: &str,
        owner: &str,
        members: &BTreeSet<String>,
    ) -> StoreResult<Group> {
        let group = Group {
            id: self.next_group_id.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            owner: owner.to_string(),
            members: members.clone(),
        };
        self.groups.insert(group.id, group.clone());
        Ok(group)
    }

    async fn get_group(&self, group_id: i64) -> StoreResult<Option<Group>> {
        Ok(self.groups.get(&group_id).map(|g| g.value().clone()))
    }

    async fn save_group(&self, group: &Group) -> StoreResult<()> {
        if let Some(mut existing) = self.groups.get_mut(&group.id) {
            *existing = group.clone();
        }
        Ok(())
    }

    async fn delete_group(&self, group_id: i64) -> StoreResult<bool> {
        self.check_group_delete()?;
        Ok(self.groups.remove(&group_id).is_some())
    }

    async fn groups_for(&self, username: &str) -> StoreResult<Vec<Group>> {
        let mut groups: Vec<Group> = self
            .groups
            .iter()
            .filter(|g| g.is_member(username))
            .map(|g| g.value().clone())
            .collect();
        groups.sort_by_key(|g| g.id);
        Ok(groups)
    }

    async fn append_direct(&self, draft: &DirectDraft) -> StoreResult<DirectMessage> {
        self.check_append()?;
        let mut log = self.direct_messages.write().await;
        let message = DirectMessage {
            id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
            sender: draft.sender.clone(),
            receiver: draft.receiver.clone(),
            content: draft.content.clone(),
            timestamp: Utc::now(),
        };
        log.push(message.clone());
        Ok(message)
    }

    async fn append_group(&self, draft: &GroupDraft) -> StoreResult<GroupMessage> {
        self.check_append()?;
        let mut log = self.group_messages.write().await;
        let message = GroupMessage {
            id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
            group_id: draft.group_id,
            sender: draft.sender.clone(),
            content: draft.content.clone(),
            timestamp: Utc::now(),
        };
        log.push(message.clone());
        Ok(message)
    }

    async fn direct_history(&self, a: &str, b: &str) -> StoreResult<Vec<DirectMessage>> {
        let log = self.direct_messages.read().await;
        Ok(log
            .iter()
            .filter(|m| {
                (m.sender == a && m.receiver == b) || (m.sender == b && m.receiver == a)
            })
            .cloned()
            .collect())
    }

    async fn group_history(&self, group_id: i64) -> StoreResult<Vec<GroupMessage>> {
        let log = self.group_messages.read().await;
        Ok(log.iter().filter(|m| m.group_id == group_id).cloned().collect())
    }

    async fn recent_direct(&self, username: &str) -> StoreResult<Vec<DirectMessage>> {
        let involved: Vec<DirectMessage> = {
            let log = self.direct_messages.read().await;
            log.iter()
                .filter(|m| m.sender == username || m.receiver == username)
                .cloned()
                .collect()
        };
        Ok(latest_per_partner(username, involved))
    }
}
