//! Property-based tests

mod group_proptest;
mod social_proptest;
