/**
 * Group Manager
 *
 * Owns group membership, ownership and lifecycle. Every mutating operation
 * runs under the group's lock and, once the change is committed, routes a
 * SYSTEM notice through the `MessageRouter` (persist, then broadcast on the
 * group channel). The notice is returned alongside the primary result.
 *
 * # Invariants
 *
 * - The owner is always a member
 * - A group with no members does not exist
 * - Group ids never change
 *
 * # Notices
 *
 * | operation | notice |
 * |-----------|--------|
 * | leave | `{user} has left the group.` (+ ` Ownership transferred to: {new}`) |
 * | kick | `{user} has been removed from the group by the owner.` |
 * | rename | `Group name changed to: {name}` |
 * | transfer | `Ownership transferred to: {user}` |
 * | delete | `Group has been deleted by the owner.` |
 *
 * The delete notice is persisted before the group record is removed; if it
 * cannot be persisted the group is left intact. It is broadcast only once
 * the record is gone. For the other operations a failed notice is logged
 * and the committed change stands.
 *
 * # Revocation
 *
 * Removing a member (leave or kick) revokes that user's subscriptions to
 * the group channel. The revocation is published with the notice, or on its
 * own when the notice could not be persisted.
 */
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

use crate::backend::error::{ChatError, ChatResult};
use crate::backend::realtime::hub::{Channel, HubEvent};
use crate::backend::realtime::router::MessageRouter;
use crate::backend::store::{ChatStore, KeyedLocks};
use crate::shared::messaging::{validate_group_name, Group, GroupDraft, GroupMessage};
use crate::shared::Identity;

/// Result of a group mutation plus the SYSTEM notice it produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupChange<T> {
    pub value: T,
    pub notice: Option<GroupMessage>,
}

pub struct GroupManager {
    store: Arc<dyn ChatStore>,
    router: Arc<MessageRouter>,
    locks: KeyedLocks<i64>,
}

impl GroupManager {
    pub fn new(store: Arc<dyn ChatStore>, router: Arc<MessageRouter>) -> Self {
        Self {
            store,
            router,
            locks: KeyedLocks::new(),
        }
    }

    /// Exclusive access to one group, for callers that must read membership
    /// and act on it without an interleaved mutation
    pub async fn guard(&self, group_id: i64) -> OwnedMutexGuard<()> {
        self.locks.lock(&group_id).await
    }

    pub async fn find(&self, group_id: i64) -> ChatResult<Option<Group>> {
        Ok(self.store.get_group(group_id).await?)
    }

    async fn load(&self, group_id: i64) -> ChatResult<Group> {
        self.store
            .get_group(group_id)
            .await?
            .ok_or(ChatError::GroupNotFound(group_id))
    }

    /// Route a SYSTEM notice for a change that has already been committed,
    /// revoking `removed`'s subscriptions along with it
    async fn announce(&self, group_id: i64, content: String, removed: Option<&str>) -> Option<GroupMessage> {
        match self.router.record_group(&GroupDraft::system(group_id, content)).await {
            Ok(notice) => {
                self.router.deliver_group(&notice, removed);
                Some(notice)
            }
            Err(e) => {
                tracing::error!("[Groups] Notice for group {} was not delivered: {}", group_id, e);
                if let Some(username) = removed {
                    self.router
                        .hub()
                        .publish(&Channel::Group(group_id), HubEvent::revoke(username, None));
                }
                None
            }
        }
    }

    /// Create a group owned by `creator`
    ///
    /// Unknown usernames in `member_usernames` are skipped; the creator is
    /// always a member.
    pub async fn create_group(
        &self,
        creator: &Identity,
        name: &str,
        member_usernames: &[String],
    ) -> ChatResult<Group> {
        validate_group_name(name)?;
        let name = name.trim();

        let mut members = BTreeSet::new();
        for username in member_usernames {
            if members.contains(username) || username == creator.as_str() {
                continue;
            }
            if self.store.user_exists(username).await? {
                members.insert(username.clone());
            } else {
                tracing::debug!("[Groups] Skipping unknown member '{}'", username);
            }
        }
        members.insert(creator.as_str().to_string());

        let group = self.store.insert_group(name, creator.as_str(), &members).await?;
        tracing::info!(
            "[Groups] {} created group {} '{}' with {} members",
            creator,
            group.id,
            group.name,
            group.members.len()
        );
        Ok(group)
    }

    /// Remove `user` from the group
    ///
    /// Returns the remaining group, or `None` when the last member left and
    /// the group was deleted (no notice in that case). An owner leaving hands
    /// ownership to the lowest remaining username.
    pub async fn leave_group(&self, user: &Identity, group_id: i64) -> ChatResult<GroupChange<Option<Group>>> {
        let _guard = self.locks.lock(&group_id).await;
        let mut group = self.load(group_id).await?;
        let username = user.as_str();

        if !group.members.remove(username) {
            return Err(ChatError::NotAMember);
        }

        if group.members.is_empty() {
            self.store.delete_group(group_id).await?;
            self.router.hub().close_channel(&Channel::Group(group_id));
            tracing::info!("[Groups] Group {} deleted after its last member left", group_id);
            return Ok(GroupChange {
                value: None,
                notice: None,
            });
        }

        let mut content = format!("{} has left the group.", username);
        if group.is_owner(username) {
            if let Some(successor) = group.successor().cloned() {
                content.push_str(&format!(" Ownership transferred to: {}", successor));
                group.owner = successor;
            }
        }

        self.store.save_group(&group).await?;
        tracing::info!("[Groups] {} left group {}", username, group_id);

        let notice = self.announce(group_id, content, Some(username)).await;
        Ok(GroupChange {
            value: Some(group),
            notice,
        })
    }

    /// Owner removes `target` from the group
    pub async fn kick_member(
        &self,
        requester: &Identity,
        group_id: i64,
        target: &str,
    ) -> ChatResult<GroupChange<Group>> {
        let _guard = self.locks.lock(&group_id).await;
        let mut group = self.load(group_id).await?;

        if !group.is_owner(requester.as_str()) {
            return Err(ChatError::NotOwner);
        }
        if !group.is_member(target) {
            return Err(ChatError::NotAMember);
        }
        if group.is_owner(target) {
            return Err(ChatError::CannotKickOwner);
        }

        group.members.remove(target);
        self.store.save_group(&group).await?;
        tracing::info!("[Groups] {} kicked {} from group {}", requester, target, group_id);

        let notice = self
            .announce(
                group_id,
                format!("{} has been removed from the group by the owner.", target),
                Some(target),
            )
            .await;
        Ok(GroupChange { value: group, notice })
    }

    pub async fn rename_group(
        &self,
        requester: &Identity,
        group_id: i64,
        new_name: &str,
    ) -> ChatResult<GroupChange<Group>> {
        let _guard = self.locks.lock(&group_id).await;
        let mut group = self.load(group_id).await?;

        if !group.is_owner(requester.as_str()) {
            return Err(ChatError::NotOwner);
        }
        validate_group_name(new_name)?;

        group.name = new_name.trim().to_string();
        self.store.save_group(&group).await?;
        tracing::info!("[Groups] Group {} renamed to '{}'", group_id, group.name);

        let notice = self
            .announce(group_id, format!("Group name changed to: {}", group.name), None)
            .await;
        Ok(GroupChange { value: group, notice })
    }

    pub async fn transfer_ownership(
        &self,
        requester: &Identity,
        group_id: i64,
        new_owner: &str,
    ) -> ChatResult<GroupChange<Group>> {
        let _guard = self.locks.lock(&group_id).await;
        let mut group = self.load(group_id).await?;

        if !group.is_owner(requester.as_str()) {
            return Err(ChatError::NotOwner);
        }
        if !group.is_member(new_owner) {
            return Err(ChatError::NotAMember);
        }

        group.owner = new_owner.to_string();
        self.store.save_group(&group).await?;
        tracing::info!("[Groups] Group {} ownership moved from {} to {}", group_id, requester, new_owner);

        let notice = self
            .announce(group_id, format!("Ownership transferred to: {}", new_owner), None)
            .await;
        Ok(GroupChange { value: group, notice })
    }

    /// Owner deletes the group
    ///
    /// The notice is persisted first, then the record is removed, then the
    /// notice is broadcast and the channel closed. If removing the record
    /// fails the stored notice stays in history, nothing is broadcast and the
    /// group keeps working.
    pub async fn delete_group(&self, requester: &Identity, group_id: i64) -> ChatResult<GroupChange<()>> {
        let _guard = self.locks.lock(&group_id).await;
        let group = self.load(group_id).await?;

        if !group.is_owner(requester.as_str()) {
            return Err(ChatError::NotOwner);
        }

        // Group id must still be valid when the notice is persisted
        let notice = self
            .router
            .record_group(&GroupDraft::system(group_id, "Group has been deleted by the owner."))
            .await?;

        if let Err(e) = self.store.delete_group(group_id).await {
            tracing::error!(
                "[Groups] Group {} kept after its delete notice {} was stored: {}",
                group_id,
                notice.id,
                e
            );
            return Err(e.into());
        }
        self.router.deliver_final(&notice);
        tracing::info!("[Groups] {} deleted group {}", requester, group_id);

        Ok(GroupChange {
            value: (),
            notice: Some(notice),
        })
    }

    /// Member list of a group, readable by its members
    pub async fn get_group_members(&self, requester: &Identity, group_id: i64) -> ChatResult<Group> {
        let group = self.load(group_id).await?;
        if !group.is_member(requester.as_str()) {
            return Err(ChatError::AuthorizationDenied);
        }
        Ok(group)
    }

    pub async fn groups_for(&self, user: &Identity) -> ChatResult<Vec<Group>> {
        Ok(self.store.groups_for(user.as_str()).await?)
    }

    /// Drop lock entries for idle groups
    pub fn prune_locks(&self) -> usize {
        self.locks.prune()
    }
}
