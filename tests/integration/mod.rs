//! Integration tests
//!
//! Drive the assembled router and the real-time session against the
//! in-memory store.

mod api;
mod realtime;
