//! Authorization Gate
//!
//! Decides whether a sender may address a receiver or a group.
//!
//! # Send Paths
//!
//! - Direct: allowed iff sender and receiver are friends
//! - Group: allowed iff the sender is a member of the group
//!
//! A `Deny` on a send path is never reported to the sender; the message is
//! dropped and the decision logged at debug level.
//!
//! # Read Paths
//!
//! History reads do report denials, as `AuthorizationDenied`. For groups the
//! existence check comes first (`GroupNotFound`).

use std::sync::Arc;

use crate::backend::error::{ChatError, ChatResult};
use crate::backend::groups::GroupManager;
use crate::backend::social::SocialGraph;
use crate::shared::messaging::Group;
use crate::shared::Identity;

/// Outcome of an authorization check on a send path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

impl From<bool> for Decision {
    fn from(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

#[derive(Clone)]
pub struct AuthorizationGate {
    social: Arc<SocialGraph>,
    groups: Arc<GroupManager>,
}

impl AuthorizationGate {
    pub fn new(social: Arc<SocialGraph>, groups: Arc<GroupManager>) -> Self {
        Self { social, groups }
    }

    pub async fn authorize_direct(&self, sender: &Identity, receiver: &str) -> ChatResult<Decision> {
        let allowed = self.social.are_friends(sender.as_str(), receiver).await?;
        Ok(Decision::from(allowed))
    }

    /// Callers that act on an `Allow` should hold the group's guard
    pub async fn authorize_group(&self, sender: &Identity, group_id: i64) -> ChatResult<Decision> {
        let allowed = match self.groups.find(group_id).await? {
            Some(group) => group.is_member(sender.as_str()),
            None => false,
        };
        Ok(Decision::from(allowed))
    }

    /// Direct history is readable only between friends
    pub async fn require_direct_party(&self, requester: &Identity, other: &str) -> ChatResult<()> {
        if self.authorize_direct(requester, other).await?.is_allowed() {
            Ok(())
        } else {
            tracing::debug!("[Gate] {} denied direct history with {}", requester, other);
            Err(ChatError::AuthorizationDenied)
        }
    }

    /// Group history is readable only by members
    pub async fn require_group_member(&self, requester: &Identity, group_id: i64) -> ChatResult<Group> {
        self.groups.get_group_members(requester, group_id).await.map_err(|e| {
            if matches!(e, ChatError::AuthorizationDenied) {
                tracing::debug!("[Gate] {} denied history of group {}", requester, group_id);
            }
            e
        })
    }
}
