/**
 * Backend Error Types
 *
 * This module defines the error taxonomy of the chat core.
 *
 * # Error Categories
 *
 * ## Authentication Errors
 *
 * `AuthError` is fatal to connection establishment and is never retried:
 * - Missing credential
 * - Malformed token
 * - Bad signature
 * - Expired token
 *
 * ## Domain Errors
 *
 * Surfaced to the caller as typed failures, never swallowed or retried:
 * - Friend graph: `SelfRequest`, `DuplicatePending`, `NoPendingRequest`,
 *   `NotFriends`, `AlreadyFriends`
 * - Groups: `NotAMember`, `NotOwner`, `CannotKickOwner`, `GroupNotFound`
 *
 * ## Authorization Errors
 *
 * `AuthorizationDenied` is only ever returned from read paths. Message sends
 * that fail authorization are dropped without an error.
 *
 * ## Persistence Errors
 *
 * `Persistence` reports a backend failure for the one operation that hit it.
 */
use axum::http::StatusCode;
use thiserror::Error;

use crate::shared::SharedError;

/// Identity verification failures
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer credential was presented
    #[error("missing bearer credential")]
    Missing,
    /// Token could not be parsed
    #[error("malformed token")]
    Malformed,
    /// Signature does not match the server secret
    #[error("bad token signature")]
    BadSignature,
    /// Token expiry is in the past
    #[error("token expired")]
    Expired,
}

/// Persistence backend failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Errors returned by the chat core and its HTTP surface
#[derive(Debug, Error)]
pub enum ChatError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("not authorized")]
    AuthorizationDenied,

    #[error("cannot send a friend request to yourself")]
    SelfRequest,

    #[error("a friend request is already pending")]
    DuplicatePending,

    #[error("no pending friend request")]
    NoPendingRequest,

    #[error("users are not friends")]
    NotFriends,

    #[error("users are already friends")]
    AlreadyFriends,

    #[error("user is not a member of this group")]
    NotAMember,

    #[error("only the group owner can do this")]
    NotOwner,

    #[error("the group owner cannot be kicked")]
    CannotKickOwner,

    #[error("group {0} not found")]
    GroupNotFound(i64),

    #[error("user '{0}' not found")]
    UserNotFound(String),

    #[error(transparent)]
    Validation(#[from] SharedError),

    #[error("persistence error: {0}")]
    Persistence(String),
}

impl From<StoreError> for ChatError {
    fn from(err: StoreError) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl From<sqlx::Error> for ChatError {
    fn from(err: sqlx::Error) -> Self {
        Self::Persistence(err.to_string())
    }
}

impl ChatError {
    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `Auth` - 401 Unauthorized
    /// - `AuthorizationDenied`, `NotOwner` - 403 Forbidden
    /// - `GroupNotFound`, `UserNotFound`, `NoPendingRequest` - 404 Not Found
    /// - `DuplicatePending`, `AlreadyFriends`, `NotFriends` - 409 Conflict
    /// - Remaining domain and validation errors - 400 Bad Request
    /// - `Persistence` - 503 Service Unavailable
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Auth(_) => StatusCode::UNAUTHORIZED,
            Self::AuthorizationDenied | Self::NotOwner => StatusCode::FORBIDDEN,
            Self::GroupNotFound(_) | Self::UserNotFound(_) | Self::NoPendingRequest => {
                StatusCode::NOT_FOUND
            }
            Self::DuplicatePending | Self::AlreadyFriends | Self::NotFriends => StatusCode::CONFLICT,
            Self::SelfRequest | Self::NotAMember | Self::CannotKickOwner | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Persistence(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable snake_case name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Auth(_) => "unauthorized",
            Self::AuthorizationDenied => "authorization_denied",
            Self::SelfRequest => "self_request",
            Self::DuplicatePending => "duplicate_pending",
            Self::NoPendingRequest => "no_pending_request",
            Self::NotFriends => "not_friends",
            Self::AlreadyFriends => "already_friends",
            Self::NotAMember => "not_a_member",
            Self::NotOwner => "not_owner",
            Self::CannotKickOwner => "cannot_kick_owner",
            Self::GroupNotFound(_) => "group_not_found",
            Self::UserNotFound(_) => "user_not_found",
            Self::Validation(_) => "validation",
            Self::Persistence(_) => "persistence",
        }
    }

    /// Message safe to return to a client
    pub fn message(&self) -> String {
        match self {
            // Backend detail stays in the logs
            Self::Persistence(_) => "storage temporarily unavailable".to_string(),
            other => other.to_string(),
        }
    }
}
