//! Social Graph Module
//!
//! Friend requests and the symmetric friendship relation.
//!
//! ```text
//! social/
//! ├── mod.rs   - Module exports
//! └── graph.rs - SocialGraph (request state machine, friend edges)
//! ```
//!
//! REST handlers for these operations live in `backend::messaging::handlers`.

/// Friend request state machine and friend edges
pub mod graph;

pub use graph::SocialGraph;
