//! Groups Module
//!
//! Group membership, ownership and lifecycle, plus the REST handlers that
//! expose them.
//!
//! # Module Structure
//!
//! ```text
//! groups/
//! ├── mod.rs      - Module exports and documentation
//! ├── manager.rs  - GroupManager (state machine, SYSTEM notices)
//! └── handlers.rs - HTTP handlers under /api/groups
//! ```

/// Group state machine
pub mod manager;

/// HTTP handlers for group management and history
pub mod handlers;

pub use manager::{GroupChange, GroupManager};
