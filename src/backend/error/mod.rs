//! Backend Error Module
//!
//! This module defines the error types of the chat core and how they are
//! rendered over HTTP.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - AuthError, StoreError, ChatError
//! └── conversion.rs - IntoResponse for ChatError
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use xfchat::backend::error::ChatError;
//! use axum::Json;
//!
//! async fn handler() -> Result<Json<()>, ChatError> {
//!     Err(ChatError::NotOwner)
//! }
//! ```

/// Error type definitions
pub mod types;

/// Error conversion implementations
pub mod conversion;

pub use types::{AuthError, ChatError, StoreError};

/// Result alias used throughout the backend
pub type ChatResult<T> = Result<T, ChatError>;
