//! API integration tests
//!
//! Integration tests for the REST endpoints

mod auth_test;
mod friends_test;
mod groups_test;
