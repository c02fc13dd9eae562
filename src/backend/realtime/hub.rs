/**
 * Channel Hub
 *
 * Per-channel broadcast senders for real-time delivery. Each personal and
 * group channel gets its own `tokio::sync::broadcast` channel so deliveries
 * never cross-talk.
 *
 * # Topics
 *
 * - `/topic/messages/{username}` - personal channel (direct messages)
 * - `/topic/group/{id}` - group channel (user messages and SYSTEM notices)
 *
 * Publishing to a channel nobody has subscribed to is a no-op. Channels
 * without receivers are swept by `cleanup_inactive_channels`, which the
 * server runs periodically.
 *
 * # Revocation
 *
 * A group channel also carries `HubEvent::Revoke` when a member is removed.
 * Sessions of that user stop listening to the channel as soon as they read
 * it, whether or not a notice rides along with it. `HubEvent::Final` is the
 * last frame before a channel closes; every session stops listening after
 * it.
 */
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::shared::ServerEvent;

/// Addressable delivery channel
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Personal channel of a user
    User(String),
    /// Shared channel of a group
    Group(i64),
}

impl Channel {
    pub fn user(username: impl Into<String>) -> Self {
        Channel::User(username.into())
    }

    /// Topic path used in logs and documentation
    pub fn topic(&self) -> String {
        match self {
            Channel::User(username) => format!("/topic/messages/{}", username),
            Channel::Group(id) => format!("/topic/group/{}", id),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.topic())
    }
}

/// What travels on a hub channel
#[derive(Debug, Clone, PartialEq)]
pub enum HubEvent {
    /// Frame for every subscriber
    Frame(ServerEvent),
    /// `username` left the channel's group; `notice` is still delivered to
    /// every subscriber, including the revoked one
    Revoke {
        username: String,
        notice: Option<ServerEvent>,
    },
    /// Last frame before the channel closes
    Final(ServerEvent),
}

impl HubEvent {
    pub fn revoke(username: impl Into<String>, notice: Option<ServerEvent>) -> Self {
        HubEvent::Revoke {
            username: username.into(),
            notice,
        }
    }

    /// Frame a subscriber should forward, if any
    pub fn frame(&self) -> Option<&ServerEvent> {
        match self {
            HubEvent::Frame(event) | HubEvent::Final(event) => Some(event),
            HubEvent::Revoke { notice, .. } => notice.as_ref(),
        }
    }
}

impl From<ServerEvent> for HubEvent {
    fn from(event: ServerEvent) -> Self {
        HubEvent::Frame(event)
    }
}

impl PartialEq<ServerEvent> for HubEvent {
    fn eq(&self, other: &ServerEvent) -> bool {
        self.frame() == Some(other)
    }
}

/// Broadcast state for all live channels
#[derive(Clone)]
pub struct ChannelHub {
    channels: Arc<DashMap<Channel, broadcast::Sender<HubEvent>>>,
    capacity: usize,
}

impl ChannelHub {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: Arc::new(DashMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Get or create the sender for a channel
    fn sender(&self, channel: &Channel) -> broadcast::Sender<HubEvent> {
        self.channels
            .entry(channel.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }

    /// Start receiving events published to `channel`
    pub fn subscribe(&self, channel: &Channel) -> broadcast::Receiver<HubEvent> {
        tracing::debug!("[Realtime] New subscriber on {}", channel);
        self.sender(channel).subscribe()
    }

    /// Deliver `event` to every current subscriber of `channel`
    ///
    /// Returns the number of subscribers reached (0 if none).
    pub fn publish(&self, channel: &Channel, event: impl Into<HubEvent>) -> usize {
        let Some(sender) = self.channels.get(channel).map(|s| s.value().clone()) else {
            tracing::debug!("[Realtime] No subscribers on {}", channel);
            return 0;
        };
        match sender.send(event.into()) {
            Ok(count) => {
                tracing::debug!("[Realtime] Event published to {} subscribers on {}", count, channel);
                count
            }
            Err(_) => {
                tracing::debug!("[Realtime] No subscribers on {}", channel);
                0
            }
        }
    }

    /// Drop the channel's sender; subscribers drain buffered events, then
    /// observe the channel as closed
    pub fn close_channel(&self, channel: &Channel) -> bool {
        let closed = self.channels.remove(channel).is_some();
        if closed {
            tracing::info!("[Realtime] Closed channel {}", channel);
        }
        closed
    }

    /// Clean up inactive channels (no subscribers)
    pub fn cleanup_inactive_channels(&self) -> usize {
        let before = self.channels.len();
        self.channels.retain(|_, sender| sender.receiver_count() > 0);
        before.saturating_sub(self.channels.len())
    }

    /// Get subscriber count for a channel (for debugging)
    pub fn subscriber_count(&self, channel: &Channel) -> usize {
        self.channels
            .get(channel)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
