//! Message send pipeline
//!
//! `validate -> authorize -> route`. Content validation runs before any
//! authorization decision, so its errors reveal nothing about the social
//! graph. A denied send returns `Ok(None)`: the message is dropped without a
//! record, a broadcast, or an error to the sender.

use std::sync::Arc;

use crate::backend::authorization::AuthorizationGate;
use crate::backend::error::ChatResult;
use crate::backend::groups::GroupManager;
use crate::backend::realtime::router::MessageRouter;
use crate::shared::messaging::{validate_content, DirectDraft, DirectMessage, GroupDraft, GroupMessage};
use crate::shared::Identity;

#[derive(Clone)]
pub struct Messenger {
    gate: AuthorizationGate,
    groups: Arc<GroupManager>,
    router: Arc<MessageRouter>,
}

impl Messenger {
    pub fn new(gate: AuthorizationGate, groups: Arc<GroupManager>, router: Arc<MessageRouter>) -> Self {
        Self { gate, groups, router }
    }

    /// Send a direct message from an authenticated sender
    pub async fn send_direct_message(
        &self,
        sender: &Identity,
        receiver: &str,
        content: &str,
    ) -> ChatResult<Option<DirectMessage>> {
        validate_content(content)?;

        if !self.gate.authorize_direct(sender, receiver).await?.is_allowed() {
            tracing::debug!("[Gate] Dropped direct message from {} to {}", sender, receiver);
            return Ok(None);
        }

        let message = self
            .router
            .route_direct(DirectDraft {
                sender: sender.as_str().to_string(),
                receiver: receiver.to_string(),
                content: content.to_string(),
            })
            .await?;
        Ok(Some(message))
    }

    /// Send a group message from an authenticated sender
    ///
    /// The membership check and the append happen under the group's guard,
    /// so a concurrent kick or leave either precedes the check or follows
    /// the append.
    pub async fn send_group_message(
        &self,
        sender: &Identity,
        group_id: i64,
        content: &str,
    ) -> ChatResult<Option<GroupMessage>> {
        validate_content(content)?;

        let _guard = self.groups.guard(group_id).await;
        if !self.gate.authorize_group(sender, group_id).await?.is_allowed() {
            tracing::debug!("[Gate] Dropped message from {} to group {}", sender, group_id);
            return Ok(None);
        }

        let message = self
            .router
            .route_group(GroupDraft {
                group_id,
                sender: sender.as_str().to_string(),
                content: content.to_string(),
            })
            .await?;
        Ok(Some(message))
    }
}
