//! Authenticated Identity
//!
//! An `Identity` is the username carried in the `sub` claim of a verified
//! bearer token. It is produced only by the token verifier and never mutated
//! afterwards; everything downstream (friendship checks, group membership,
//! channel addressing) keys on it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Verified subject of a bearer credential
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wrap a username that has already been verified
    pub fn new(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    /// Borrow the username
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
