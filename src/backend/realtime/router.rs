/**
 * Message Router
 *
 * Persist-then-broadcast for every routed message, user-authored or SYSTEM.
 *
 * 1. Append the message to the store (id and server timestamp assigned)
 * 2. On success, publish the persisted message to its channel(s)
 * 3. On failure, publish nothing and report `Persistence`
 *
 * Direct messages go to the receiver's personal channel and, when
 * `echo_to_sender` is set, to the sender's own channel as well. Group
 * messages go to the group channel.
 *
 * The router performs no authorization; callers route only what the
 * authorization gate allowed.
 */
use std::sync::Arc;

use crate::backend::error::{ChatError, ChatResult};
use crate::backend::realtime::hub::{Channel, ChannelHub, HubEvent};
use crate::backend::store::ChatStore;
use crate::shared::messaging::{DirectDraft, DirectMessage, GroupDraft, GroupMessage};
use crate::shared::ServerEvent;

pub struct MessageRouter {
    store: Arc<dyn ChatStore>,
    hub: ChannelHub,
    echo_to_sender: bool,
}

impl MessageRouter {
    pub fn new(store: Arc<dyn ChatStore>, hub: ChannelHub, echo_to_sender: bool) -> Self {
        Self {
            store,
            hub,
            echo_to_sender,
        }
    }

    pub fn hub(&self) -> &ChannelHub {
        &self.hub
    }

    pub async fn route_direct(&self, draft: DirectDraft) -> ChatResult<DirectMessage> {
        let message = self.store.append_direct(&draft).await.map_err(|e| {
            tracing::error!(
                "[Router] Failed to persist direct message {} -> {}: {}",
                draft.sender,
                draft.receiver,
                e
            );
            ChatError::from(e)
        })?;

        let event = ServerEvent::DirectMessage(message.clone());
        self.hub.publish(&Channel::user(&message.receiver), event.clone());
        if self.echo_to_sender && message.sender != message.receiver {
            self.hub.publish(&Channel::user(&message.sender), event);
        }

        tracing::debug!(
            "[Router] Routed direct message {} from {} to {}",
            message.id,
            message.sender,
            message.receiver
        );
        Ok(message)
    }

    pub async fn route_group(&self, draft: GroupDraft) -> ChatResult<GroupMessage> {
        let message = self.record_group(&draft).await?;
        self.deliver_group(&message, None);
        Ok(message)
    }

    /// Persist a group message without publishing it
    pub async fn record_group(&self, draft: &GroupDraft) -> ChatResult<GroupMessage> {
        self.store.append_group(draft).await.map_err(|e| {
            tracing::error!(
                "[Router] Failed to persist message from {} to group {}: {}",
                draft.sender,
                draft.group_id,
                e
            );
            ChatError::from(e)
        })
    }

    /// Publish a persisted group message
    ///
    /// Sessions of `revoked` receive the message and then stop listening to
    /// the group channel.
    pub fn deliver_group(&self, message: &GroupMessage, revoked: Option<&str>) {
        let frame = ServerEvent::GroupMessage(message.clone());
        let event = match revoked {
            Some(username) => HubEvent::revoke(username, Some(frame)),
            None => HubEvent::Frame(frame),
        };
        self.hub.publish(&Channel::Group(message.group_id), event);

        tracing::debug!(
            "[Router] Routed group message {} from {} to group {}",
            message.id,
            message.sender,
            message.group_id
        );
    }

    /// Publish the last message of a group and close its channel
    pub fn deliver_final(&self, message: &GroupMessage) {
        let channel = Channel::Group(message.group_id);
        self.hub
            .publish(&channel, HubEvent::Final(ServerEvent::GroupMessage(message.clone())));
        self.hub.close_channel(&channel);
    }
}
