//! Server Module
//!
//! This module contains the code that assembles and starts the Axum server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Configuration loading and store selection
//! - **`init`** - App creation and background tasks
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports and documentation
//! ├── state.rs  - AppState and FromRef implementations
//! ├── config.rs - Configuration loading (file, env) and store selection
//! └── init.rs   - Server initialization and cleanup task
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use xfchat::backend::server::{create_app, load_config};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let app = create_app(config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use config::{load_config, load_store};
pub use init::{create_app, spawn_cleanup_task};
pub use state::AppState;
