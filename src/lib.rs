//! xfchat - Main Library
//!
//! xfchat is a real-time chat backend: authenticated WebSocket connections,
//! a friend graph, owner-administered groups, and persist-then-broadcast
//! message fanout, with a REST surface for management and history.
//!
//! # Module Structure
//!
//! - **`shared`** - Serializable types usable by any client
//!   - Identity, friend requests, groups, messages
//!   - WebSocket frames (`ClientFrame`, `ServerEvent`)
//!   - Configuration and shared errors
//!
//! - **`backend`** - Server-side code
//!   - Identity Verifier and Connection Authenticator
//!   - Social Graph, Group Manager, Authorization Gate
//!   - Channel hub and Message Router
//!   - Axum routes, middleware, PostgreSQL and in-memory stores
//!
//! # Usage
//!
//! ```rust,no_run
//! use xfchat::backend::server::{create_app, load_config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(load_config()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
