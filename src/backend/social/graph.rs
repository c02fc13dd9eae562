/**
 * Social Graph Manager
 *
 * Owns the friend-request state machine and the symmetric friend-edge set.
 *
 * # Friend Request Lifecycle
 *
 * ```text
 * send --> Pending --accept--> Accepted (edge inserted in the same commit)
 *                  \--reject--> Rejected
 * ```
 *
 * Terminal requests are never reopened. Uniqueness is scoped to
 * (sender, receiver, Pending): after a rejection the same sender may file a
 * new request, and a counter-request in the opposite direction is a separate
 * record.
 *
 * # Concurrency
 *
 * Every mutation of a pair runs under that pair's lock, so concurrent
 * accept/reject/remove on one pair serialize while unrelated pairs proceed
 * independently. `are_friends` is a lock-free point lookup.
 */
use std::sync::Arc;

use crate::backend::error::{ChatError, ChatResult};
use crate::backend::store::{ChatStore, FriendPair, KeyedLocks};
use crate::shared::messaging::{FriendRequest, FriendRequestStatus};
use crate::shared::Identity;

pub struct SocialGraph {
    store: Arc<dyn ChatStore>,
    locks: KeyedLocks<FriendPair>,
}

impl SocialGraph {
    pub fn new(store: Arc<dyn ChatStore>) -> Self {
        Self {
            store,
            locks: KeyedLocks::new(),
        }
    }

    /// File a pending request from `sender` to `receiver`
    ///
    /// # Errors
    ///
    /// - `SelfRequest` - sender and receiver are the same user
    /// - `UserNotFound` - receiver has never connected
    /// - `AlreadyFriends` - the pair is already connected
    /// - `DuplicatePending` - sender already has a pending request to receiver
    pub async fn send_friend_request(&self, sender: &Identity, receiver: &str) -> ChatResult<FriendRequest> {
        let sender = sender.as_str();
        if sender == receiver {
            return Err(ChatError::SelfRequest);
        }
        if !self.store.user_exists(receiver).await? {
            return Err(ChatError::UserNotFound(receiver.to_string()));
        }

        let _guard = self.locks.lock(&FriendPair::new(sender, receiver)).await;

        if self.store.are_friends(sender, receiver).await? {
            return Err(ChatError::AlreadyFriends);
        }
        if self.store.find_pending_request(sender, receiver).await?.is_some() {
            return Err(ChatError::DuplicatePending);
        }

        let request = self.store.insert_friend_request(sender, receiver).await?;
        tracing::info!("[Social] Friend request {} from {} to {}", request.id, sender, receiver);
        Ok(request)
    }

    /// Accept the pending request from `sender`; the edge becomes visible in
    /// both directions atomically with the status change
    pub async fn accept_friend_request(&self, receiver: &Identity, sender: &str) -> ChatResult<FriendRequest> {
        self.resolve(receiver, sender, FriendRequestStatus::Accepted).await
    }

    /// Reject the pending request from `sender`; no edge is created
    pub async fn reject_friend_request(&self, receiver: &Identity, sender: &str) -> ChatResult<FriendRequest> {
        self.resolve(receiver, sender, FriendRequestStatus::Rejected).await
    }

    async fn resolve(
        &self,
        receiver: &Identity,
        sender: &str,
        status: FriendRequestStatus,
    ) -> ChatResult<FriendRequest> {
        let receiver = receiver.as_str();
        let _guard = self.locks.lock(&FriendPair::new(sender, receiver)).await;

        let pending = self
            .store
            .find_pending_request(sender, receiver)
            .await?
            .ok_or(ChatError::NoPendingRequest)?;

        // The store only resolves a request that is still pending
        let resolved = self
            .store
            .resolve_friend_request(pending.id, status)
            .await?
            .ok_or(ChatError::NoPendingRequest)?;

        tracing::info!(
            "[Social] Friend request {} from {} to {} {}",
            resolved.id,
            sender,
            receiver,
            status.as_str()
        );
        Ok(resolved)
    }

    /// Remove the friendship between `a` and `b`
    ///
    /// Reports `NotFriends` when there was no edge, so repeating the call
    /// leaves the friendship absent and tells the caller so.
    pub async fn remove_friend(&self, a: &Identity, b: &str) -> ChatResult<()> {
        let a = a.as_str();
        let _guard = self.locks.lock(&FriendPair::new(a, b)).await;

        if !self.store.remove_friendship(a, b).await? {
            return Err(ChatError::NotFriends);
        }
        tracing::info!("[Social] {} removed {} as a friend", a, b);
        Ok(())
    }

    /// Hot path of the authorization gate
    pub async fn are_friends(&self, a: &str, b: &str) -> ChatResult<bool> {
        Ok(self.store.are_friends(a, b).await?)
    }

    pub async fn list_friends(&self, user: &Identity) -> ChatResult<Vec<String>> {
        Ok(self.store.friends_of(user.as_str()).await?)
    }

    /// Pending requests addressed to `user`
    pub async fn pending_requests(&self, user: &Identity) -> ChatResult<Vec<FriendRequest>> {
        Ok(self.store.pending_requests_for(user.as_str()).await?)
    }

    /// Drop lock entries for idle pairs
    pub fn prune_locks(&self) -> usize {
        self.locks.prune()
    }
}
