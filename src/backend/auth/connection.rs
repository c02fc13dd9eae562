/**
 * Connection Authentication
 *
 * Binds a verified identity to a live connection at handshake time and
 * gates every later inbound frame on that binding.
 *
 * # State Machine
 *
 * ```text
 * Unauthenticated --handshake ok--> Authenticated --close--> Closed
 *        |                                                    ^
 *        +--------------handshake failed / close--------------+
 * ```
 *
 * A failed handshake refuses the connection outright; it never leaves an
 * open unauthenticated connection behind.
 *
 * # Bindings
 *
 * `ConnectionRegistry` is the association table from connection id to
 * identity: an entry is inserted on a successful handshake and removed when
 * the connection closes. Nothing else stores the identity.
 */
use dashmap::DashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::auth::sessions::TokenVerifier;
use crate::backend::error::{AuthError, ChatError, ChatResult};
use crate::backend::store::ChatStore;
use crate::shared::{Identity, SharedError};

pub type ConnectionId = Uuid;

/// Lifecycle of one connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Unauthenticated,
    Authenticated(Identity),
    Closed,
}

/// Transport-owned connection handle
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    state: ConnectionState,
}

impl Connection {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: ConnectionState::Unauthenticated,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    /// Bound identity, if authenticated
    pub fn identity(&self) -> Option<&Identity> {
        match &self.state {
            ConnectionState::Authenticated(identity) => Some(identity),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.state, ConnectionState::Authenticated(_))
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, ConnectionState::Closed)
    }
}

impl Default for Connection {
    fn default() -> Self {
        Self::new()
    }
}

/// Live connection-to-identity bindings
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    bindings: DashMap<ConnectionId, Identity>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn bind(&self, id: ConnectionId, identity: Identity) {
        self.bindings.insert(id, identity);
    }

    fn release(&self, id: ConnectionId) -> Option<Identity> {
        self.bindings.remove(&id).map(|(_, identity)| identity)
    }

    pub fn identity_of(&self, id: ConnectionId) -> Option<Identity> {
        self.bindings.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of authenticated connections for `username`
    pub fn connections_for(&self, username: &str) -> usize {
        self.bindings
            .iter()
            .filter(|entry| entry.value().as_str() == username)
            .count()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Drives the per-connection state machine
#[derive(Clone)]
pub struct ConnectionAuthenticator {
    verifier: TokenVerifier,
    registry: Arc<ConnectionRegistry>,
    store: Arc<dyn ChatStore>,
}

impl ConnectionAuthenticator {
    pub fn new(verifier: TokenVerifier, registry: Arc<ConnectionRegistry>, store: Arc<dyn ChatStore>) -> Self {
        Self {
            verifier,
            registry,
            store,
        }
    }

    pub fn verifier(&self) -> &TokenVerifier {
        &self.verifier
    }

    pub fn registry(&self) -> &Arc<ConnectionRegistry> {
        &self.registry
    }

    /// Verify `credential` and bind the identity to `conn`
    ///
    /// On failure the connection is closed; callers must refuse it.
    pub async fn handshake(&self, conn: &mut Connection, credential: &str) -> ChatResult<Identity> {
        match &conn.state {
            ConnectionState::Unauthenticated => {}
            ConnectionState::Authenticated(identity) => {
                tracing::debug!("[Auth] Connection {} already bound to {}", conn.id, identity);
                return Err(SharedError::validation("connect", "connection is already authenticated").into());
            }
            ConnectionState::Closed => return Err(AuthError::Missing.into()),
        }

        let identity = match self.verifier.verify(credential) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!("[Auth] Handshake refused for connection {}: {}", conn.id, e);
                conn.state = ConnectionState::Closed;
                return Err(e.into());
            }
        };

        if let Err(e) = self.store.ensure_user(identity.as_str()).await {
            tracing::error!("[Auth] Failed to record user {}: {}", identity, e);
            conn.state = ConnectionState::Closed;
            return Err(ChatError::from(e));
        }

        self.registry.bind(conn.id, identity.clone());
        conn.state = ConnectionState::Authenticated(identity.clone());
        tracing::info!("[Auth] Connection {} authenticated as {}", conn.id, identity);
        Ok(identity)
    }

    /// Identity to process a non-handshake frame under, or `None` to drop it
    pub fn admit<'a>(&self, conn: &'a Connection, frame_kind: &str) -> Option<&'a Identity> {
        match &conn.state {
            ConnectionState::Authenticated(identity) => Some(identity),
            ConnectionState::Unauthenticated => {
                tracing::warn!(
                    "[Auth] Dropping {} frame on unauthenticated connection {}",
                    frame_kind,
                    conn.id
                );
                None
            }
            ConnectionState::Closed => None,
        }
    }

    /// Transition to `Closed` and release the binding
    pub fn close(&self, conn: &mut Connection) {
        if let Some(identity) = self.registry.release(conn.id) {
            tracing::info!("[Auth] Connection {} for {} closed", conn.id, identity);
        }
        conn.state = ConnectionState::Closed;
    }
}
