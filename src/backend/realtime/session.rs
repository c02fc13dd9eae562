/**
 * Real-time Session
 *
 * Per-connection frame processing, independent of the transport. The
 * WebSocket layer feeds text frames into `handle_text` and forwards whatever
 * `next_event` yields from the session's subscriptions.
 *
 * # Subscriptions
 *
 * - The personal channel is subscribed automatically on authentication
 * - Group channels are subscribed with `subscribe {group_id}`, which
 *   requires membership
 * - A revocation on a group channel naming this user (leave or kick) ends
 *   the subscription right after the notice it carries
 * - The final frame of a deleted group ends the subscription
 * - A group subscription that lagged is re-checked against membership
 *   before anything else is forwarded
 *
 * `next_event` awaits only the subscription streams after pulling an
 * event, so it is safe to use as a `select!` branch.
 *
 * # Errors
 *
 * Send denials produce nothing. Validation and persistence failures produce
 * an `error` frame; a failed handshake produces an `unauthorized` error and
 * asks the transport to close.
 */
use std::collections::BTreeSet;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{StreamExt, StreamMap};

use crate::backend::auth::Connection;
use crate::backend::error::ChatError;
use crate::backend::realtime::hub::{Channel, HubEvent};
use crate::backend::server::state::AppState;
use crate::shared::{ClientFrame, ErrorCode, Identity, ServerEvent};

/// What the transport should do after a frame
#[derive(Debug, Default, PartialEq)]
pub struct Reply {
    /// Frames to send back on this connection, in order
    pub events: Vec<ServerEvent>,
    /// Close the connection after sending `events`
    pub close: bool,
}

impl Reply {
    fn none() -> Self {
        Self::default()
    }

    fn event(event: ServerEvent) -> Self {
        Self {
            events: vec![event],
            close: false,
        }
    }

    fn refuse(event: ServerEvent) -> Self {
        Self {
            events: vec![event],
            close: true,
        }
    }
}

/// Map a failed operation to the error frame a client sees
pub fn error_event(err: &ChatError) -> ServerEvent {
    let code = match err {
        ChatError::Auth(_) => ErrorCode::Unauthorized,
        ChatError::Validation(_) => ErrorCode::Invalid,
        ChatError::Persistence(_) => ErrorCode::Unavailable,
        ChatError::AuthorizationDenied | ChatError::NotAMember | ChatError::GroupNotFound(_) => {
            ErrorCode::Forbidden
        }
        _ => ErrorCode::Invalid,
    };
    ServerEvent::error(code, err.message())
}

pub struct Session {
    state: AppState,
    conn: Connection,
    subscriptions: StreamMap<Channel, BroadcastStream<HubEvent>>,
    /// Groups whose subscription lagged and may have missed a revocation
    stale: BTreeSet<i64>,
}

impl Session {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            conn: Connection::new(),
            subscriptions: StreamMap::new(),
            stale: BTreeSet::new(),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.conn.identity()
    }

    pub fn is_authenticated(&self) -> bool {
        self.conn.is_authenticated()
    }

    pub fn has_subscriptions(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    pub fn is_subscribed(&self, channel: &Channel) -> bool {
        self.subscriptions.contains_key(channel)
    }

    fn subscribe_channel(&mut self, channel: Channel) {
        if !self.subscriptions.contains_key(&channel) {
            let rx = self.state.hub.subscribe(&channel);
            self.subscriptions.insert(channel, BroadcastStream::new(rx));
        }
    }

    /// Handshake with `credential`; on success returns the `connected` frame
    pub async fn authenticate(&mut self, credential: &str) -> Result<ServerEvent, ChatError> {
        let identity = self.state.authenticator.handshake(&mut self.conn, credential).await?;
        self.subscribe_channel(Channel::user(identity.as_str()));
        Ok(ServerEvent::Connected {
            username: identity.into_inner(),
        })
    }

    /// Process one inbound text frame
    pub async fn handle_text(&mut self, text: &str) -> Reply {
        if self.conn.is_closed() {
            return Reply::none();
        }
        match ClientFrame::parse(text) {
            Ok(frame) => self.handle_frame(frame).await,
            Err(e) => {
                tracing::debug!("[Realtime] Unparseable frame on {}: {}", self.conn.id(), e);
                Reply::event(ServerEvent::error(ErrorCode::BadFrame, e.to_string()))
            }
        }
    }

    pub async fn handle_frame(&mut self, frame: ClientFrame) -> Reply {
        if let ClientFrame::Connect { token } = frame {
            return match self.authenticate(&token).await {
                Ok(connected) => Reply::event(connected),
                Err(e @ ChatError::Auth(_)) => Reply::refuse(error_event(&e)),
                Err(e) if self.conn.is_closed() => Reply::refuse(error_event(&e)),
                Err(e) => Reply::event(error_event(&e)),
            };
        }

        let Some(identity) = self.state.authenticator.admit(&self.conn, frame.kind()).cloned() else {
            return Reply::none();
        };

        match frame {
            ClientFrame::Connect { .. } => Reply::none(),
            ClientFrame::DirectMessage { receiver, content } => {
                match self
                    .state
                    .messenger
                    .send_direct_message(&identity, &receiver, &content)
                    .await
                {
                    Ok(_) => Reply::none(),
                    Err(e) => Reply::event(error_event(&e)),
                }
            }
            ClientFrame::GroupMessage { group_id, content } => {
                match self
                    .state
                    .messenger
                    .send_group_message(&identity, group_id, &content)
                    .await
                {
                    Ok(_) => Reply::none(),
                    Err(e) => Reply::event(error_event(&e)),
                }
            }
            ClientFrame::Subscribe { group_id } => self.subscribe_group(&identity, group_id).await,
            ClientFrame::Unsubscribe { group_id } => {
                self.subscriptions.remove(&Channel::Group(group_id));
                Reply::none()
            }
            ClientFrame::Ping => Reply::event(ServerEvent::Pong),
        }
    }

    async fn subscribe_group(&mut self, identity: &Identity, group_id: i64) -> Reply {
        // No kick or leave may commit between the check and the subscribe
        let _guard = self.state.groups.guard(group_id).await;
        let member = match self.state.groups.find(group_id).await {
            Ok(group) => group.is_some_and(|g| g.is_member(identity.as_str())),
            Err(e) => return Reply::event(error_event(&e)),
        };
        if !member {
            tracing::debug!("[Realtime] {} refused subscription to group {}", identity, group_id);
            return Reply::event(ServerEvent::error(
                ErrorCode::Forbidden,
                format!("cannot subscribe to group {}", group_id),
            ));
        }
        self.subscribe_channel(Channel::Group(group_id));
        Reply::none()
    }

    /// Next event from any subscribed channel
    ///
    /// Returns `None` once there are no subscriptions left.
    pub async fn next_event(&mut self) -> Option<ServerEvent> {
        loop {
            self.recheck_stale().await;

            let (channel, item) = self.subscriptions.next().await?;
            match item {
                Ok(event) => {
                    if let Some(frame) = self.apply(&channel, event) {
                        return Some(frame);
                    }
                }
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "[Realtime] Connection {} lagged {} events on {}",
                        self.conn.id(),
                        skipped,
                        channel
                    );
                    if let Channel::Group(group_id) = channel {
                        self.stale.insert(group_id);
                    }
                }
            }
        }
    }

    /// Apply a hub event to the subscription set and return the frame to
    /// forward, if any
    fn apply(&mut self, channel: &Channel, event: HubEvent) -> Option<ServerEvent> {
        match event {
            HubEvent::Frame(frame) => Some(frame),
            HubEvent::Revoke { username, notice } => {
                if self.identity().is_some_and(|identity| identity.as_str() == username) {
                    tracing::debug!("[Realtime] {} removed from {}, unsubscribing", username, channel);
                    self.subscriptions.remove(channel);
                }
                notice
            }
            HubEvent::Final(frame) => {
                self.subscriptions.remove(channel);
                Some(frame)
            }
        }
    }

    async fn recheck_stale(&mut self) {
        while let Some(group_id) = self.stale.first().copied() {
            let Some(username) = self.conn.identity().map(|i| i.as_str().to_string()) else {
                self.stale.clear();
                return;
            };
            let still_member = match self.state.groups.find(group_id).await {
                Ok(group) => group.is_some_and(|g| g.is_member(&username)),
                Err(e) => {
                    tracing::warn!("[Realtime] Membership of {} in group {} unreadable: {}", username, group_id, e);
                    true
                }
            };
            self.stale.remove(&group_id);
            if !still_member {
                tracing::debug!("[Realtime] {} no longer in group {}, unsubscribing", username, group_id);
                self.subscriptions.remove(&Channel::Group(group_id));
            }
        }
    }

    /// Release the identity binding and every subscription
    pub fn close(&mut self) {
        self.subscriptions.clear();
        self.stale.clear();
        if !self.conn.is_closed() {
            self.state.authenticator.close(&mut self.conn);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}
