//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the server and its clients. These types are used for serialization and
//! communication over the WebSocket protocol and the REST API.
//!
//! # Overview
//!
//! The shared module provides platform-agnostic types that can be used
//! in both server and client code. All wire types are designed for
//! serialization and transmission as JSON.

/// Authenticated identity
pub mod identity;

/// WebSocket frame types
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Friend, group and message types
pub mod messaging;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, FileConfig};
pub use error::SharedError;
pub use event::{ClientFrame, ErrorCode, ServerEvent};
pub use identity::Identity;
