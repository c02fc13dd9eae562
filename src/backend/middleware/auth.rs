/**
 * Authentication Middleware
 *
 * This module protects the REST surface. It extracts the bearer token from
 * the Authorization header, verifies it with the Identity Verifier, records
 * the user in the directory and hands the identity to handlers.
 */

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::bearer_token;
use crate::backend::error::{AuthError, ChatError};
use crate::backend::server::state::AppState;
use crate::shared::Identity;

/// Authenticated user data extracted from the bearer token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub identity: Identity,
}

/// Authentication middleware
///
/// This middleware:
/// 1. Extracts the bearer token from the Authorization header
/// 2. Verifies the token
/// 3. Records the subject in the user directory
/// 4. Attaches the identity to request extensions for use in handlers
///
/// Returns 401 Unauthorized if the token is missing or invalid, and 503 if
/// the user directory cannot be written.
pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ChatError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| {
            tracing::warn!("[Auth] Missing or malformed Authorization header");
            ChatError::Auth(AuthError::Missing)
        })?;

    let identity = app_state.verifier.verify(token).map_err(|e| {
        tracing::warn!("[Auth] Rejected bearer token: {}", e);
        ChatError::Auth(e)
    })?;

    app_state.store.ensure_user(identity.as_str()).await?;

    request.extensions_mut().insert(AuthenticatedUser { identity });
    Ok(next.run(request).await)
}

/// Axum extractor for the authenticated user
///
/// Handlers behind `auth_middleware` take this as a parameter to get the
/// caller's identity.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl AuthUser {
    pub fn identity(&self) -> &Identity {
        &self.0.identity
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ChatError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| {
                tracing::warn!("[Auth] AuthenticatedUser not found in request extensions");
                ChatError::Auth(AuthError::Missing)
            })?;

        Ok(AuthUser(user))
    }
}
