/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` wires the chat core together over one `ChatStore`:
 * - `TokenVerifier` and `ConnectionAuthenticator` (identity)
 * - `SocialGraph` and `GroupManager` (state machines)
 * - `AuthorizationGate` (send and read decisions)
 * - `ChannelHub`, `MessageRouter` and `Messenger` (delivery)
 *
 * # Thread Safety
 *
 * Every component is shared through `Arc` or is itself a cheap handle over
 * shared state, so cloning `AppState` per request costs a few reference
 * count bumps.
 *
 * # Example
 *
 * ```rust,no_run
 * use std::sync::Arc;
 * use axum::extract::State;
 * use xfchat::backend::social::SocialGraph;
 *
 * async fn handler(State(social): State<Arc<SocialGraph>>) {
 *     // ...
 * }
 * ```
 */
use axum::extract::FromRef;
use std::sync::Arc;
use std::time::Duration;

use crate::backend::auth::{ConnectionAuthenticator, ConnectionRegistry, TokenVerifier};
use crate::backend::authorization::AuthorizationGate;
use crate::backend::groups::GroupManager;
use crate::backend::realtime::hub::ChannelHub;
use crate::backend::realtime::messenger::Messenger;
use crate::backend::realtime::router::MessageRouter;
use crate::backend::social::SocialGraph;
use crate::backend::store::ChatStore;
use crate::shared::AppConfig;

/// Central state container shared by every handler and WebSocket session
#[derive(Clone)]
pub struct AppState {
    /// Validated configuration
    pub config: Arc<AppConfig>,

    /// Persistence backend (PostgreSQL or in-memory)
    pub store: Arc<dyn ChatStore>,

    /// Bearer token verifier
    pub verifier: TokenVerifier,

    /// Per-connection handshake and connection-to-identity bindings
    pub authenticator: ConnectionAuthenticator,

    /// Friend requests and friendships
    pub social: Arc<SocialGraph>,

    /// Group membership and lifecycle
    pub groups: Arc<GroupManager>,

    /// Send and read authorization
    pub gate: AuthorizationGate,

    /// Per-channel broadcast senders
    pub hub: ChannelHub,

    /// Persist-then-broadcast
    pub router: Arc<MessageRouter>,

    /// Validate, authorize and route user messages
    pub messenger: Messenger,
}

impl AppState {
    /// Wire every component over `store`
    pub fn new(config: AppConfig, store: Arc<dyn ChatStore>) -> Self {
        let verifier = TokenVerifier::new(&config.jwt_secret, config.token_leeway_secs);
        let authenticator = ConnectionAuthenticator::new(
            verifier.clone(),
            Arc::new(ConnectionRegistry::new()),
            store.clone(),
        );

        let hub = ChannelHub::new(config.channel_capacity);
        let router = Arc::new(MessageRouter::new(store.clone(), hub.clone(), config.echo_to_sender));
        let social = Arc::new(SocialGraph::new(store.clone()));
        let groups = Arc::new(GroupManager::new(store.clone(), router.clone()));
        let gate = AuthorizationGate::new(social.clone(), groups.clone());
        let messenger = Messenger::new(gate.clone(), groups.clone(), router.clone());

        Self {
            config: Arc::new(config),
            store,
            verifier,
            authenticator,
            social,
            groups,
            gate,
            hub,
            router,
            messenger,
        }
    }

    /// How long a connection may stay unauthenticated
    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.config.auth_timeout_secs)
    }

    /// Periodic maintenance: idle broadcast channels and idle entity locks
    pub fn cleanup(&self) -> (usize, usize) {
        let channels = self.hub.cleanup_inactive_channels();
        let locks = self.social.prune_locks() + self.groups.prune_locks();
        (channels, locks)
    }
}

/// Implement FromRef for the persistence backend
impl FromRef<AppState> for Arc<dyn ChatStore> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

/// Implement FromRef for SocialGraph
///
/// Allows handlers to take `State<Arc<SocialGraph>>` directly.
impl FromRef<AppState> for Arc<SocialGraph> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.social.clone()
    }
}

/// Implement FromRef for GroupManager
impl FromRef<AppState> for Arc<GroupManager> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.groups.clone()
    }
}

impl FromRef<AppState> for AuthorizationGate {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.gate.clone()
    }
}

impl FromRef<AppState> for TokenVerifier {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.verifier.clone()
    }
}

/// Implement FromRef for ChannelHub
///
/// Handlers that only need to inspect channels can extract the hub without
/// the rest of the state.
impl FromRef<AppState> for ChannelHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.hub.clone()
    }
}
