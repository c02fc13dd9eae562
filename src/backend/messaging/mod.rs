//! Messaging Module
//!
//! REST handlers for the friend graph and direct message history.
//!
//! # Endpoints
//!
//! - `POST /api/friends/request` - Send a friend request
//! - `POST /api/friends/accept` - Accept a pending request
//! - `POST /api/friends/reject` - Reject a pending request
//! - `DELETE /api/friends/{username}` - Remove a friendship
//! - `GET /api/friends` - List friends
//! - `GET /api/friends/requests` - List pending requests received
//! - `GET /api/messages/history/{username}` - Direct history with a friend
//! - `GET /api/messages/recent` - Latest message per conversation
//!
//! Message sending itself happens over the WebSocket (`backend::realtime`).

pub mod handlers;

pub use handlers::*;
