//! Middleware Module
//!
//! This module contains the HTTP middleware for the backend server.
//!
//! # Architecture
//!
//! - **`auth`** - Bearer authentication for the `/api` routes
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::{middleware, Router};
//! use xfchat::backend::middleware::auth_middleware;
//! use xfchat::backend::server::state::AppState;
//!
//! fn protect(routes: Router<AppState>, state: AppState) -> Router<AppState> {
//!     routes.route_layer(middleware::from_fn_with_state(state, auth_middleware))
//! }
//! ```

pub mod auth;

pub use auth::{auth_middleware, AuthUser, AuthenticatedUser};
