//! Backend Module
//!
//! This module contains all server-side code for xfchat: the chat core
//! (identity, social graph, groups, authorization, fanout) and the Axum
//! server that exposes it over WebSocket and REST.
//!
//! # Architecture
//!
//! - **`auth`** - Identity Verifier and Connection Authenticator
//! - **`social`** - Friend requests and friendships
//! - **`groups`** - Group membership, ownership and lifecycle
//! - **`authorization`** - Send and read authorization decisions
//! - **`realtime`** - Channel hub, message router, WebSocket sessions
//! - **`store`** - Persistence trait, in-memory and PostgreSQL stores
//! - **`messaging`** - REST handlers for friends and direct history
//! - **`middleware`** - Bearer authentication for REST routes
//! - **`routes`** - Router assembly
//! - **`server`** - State, configuration, initialization
//! - **`error`** - Error types and HTTP mapping
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── auth/           - Token verification and connection handshake
//! ├── social/         - SocialGraph
//! ├── groups/         - GroupManager and its handlers
//! ├── authorization/  - AuthorizationGate
//! ├── realtime/       - Hub, router, sessions, WebSocket
//! ├── store/          - ChatStore implementations
//! ├── messaging/      - Friend and history handlers
//! ├── middleware/     - Request middleware
//! ├── routes/         - Route configuration
//! ├── server/         - Server initialization and state
//! └── error/          - Error types
//! ```
//!
//! # Thread Safety
//!
//! Shared maps are `DashMap`s, message logs sit behind `tokio::sync::RwLock`,
//! and mutations of one friend pair or one group are serialised by
//! per-entity async mutexes (`store::KeyedLocks`). Unrelated entities never
//! contend.

/// Authentication
pub mod auth;

/// Send and read authorization
pub mod authorization;

/// Backend error types
pub mod error;

/// Group management
pub mod groups;

/// Friend and direct-history REST handlers
pub mod messaging;

/// Middleware for request processing
pub mod middleware;

/// Real-time delivery
pub mod realtime;

/// Route configuration
pub mod routes;

/// Server setup and configuration
pub mod server;

/// Friend graph
pub mod social;

/// Persistence
pub mod store;

pub use error::{ChatError, ChatResult};
pub use server::{create_app, AppState};
