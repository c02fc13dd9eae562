//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs        - Module exports and documentation
//! ├── router.rs     - Main router creation (public routes, tracing, fallback)
//! └── api_routes.rs - Bearer-authenticated REST endpoints
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xfchat::backend::routes::create_router;
//! use xfchat::backend::server::state::AppState;
//! use xfchat::backend::store::MemoryStore;
//! use xfchat::shared::AppConfig;
//!
//! let config = AppConfig::builder().jwt_secret("dev-secret").build().unwrap();
//! let router = create_router(AppState::new(config, Arc::new(MemoryStore::new())));
//! ```

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
