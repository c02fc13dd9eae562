/**
 * Token Verification
 *
 * This module implements the Identity Verifier: it checks a bearer token's
 * HS256 signature against the server secret, checks expiry, and extracts
 * the subject as an `Identity`.
 *
 * # Claims
 *
 * ```json
 * { "sub": "alice", "iat": 1735689600, "exp": 1738281600 }
 * ```
 *
 * Verification has no side effects and depends only on the credential, the
 * secret and the current time. Token issuance is provided for local tooling
 * and tests; production tokens come from an external issuer sharing the
 * secret.
 */
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::backend::error::AuthError;
use crate::shared::messaging::SYSTEM_SENDER;
use crate::shared::Identity;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Username
    pub sub: String,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
}

impl Claims {
    /// Claims for `username` valid for `ttl_secs` from now
    pub fn for_user(username: &str, ttl_secs: u64) -> Self {
        let now = jsonwebtoken::get_current_timestamp();
        Self {
            sub: username.to_string(),
            iat: now,
            exp: now + ttl_secs,
        }
    }
}

/// Verifies bearer tokens signed with the shared server secret
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("leeway", &self.validation.leeway)
            .finish_non_exhaustive()
    }
}

impl TokenVerifier {
    /// Create a verifier for `secret`, tolerating `leeway_secs` of clock skew
    pub fn new(secret: &str, leeway_secs: u64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = leeway_secs;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Verify a credential and return the identity it names
    ///
    /// # Errors
    ///
    /// - `AuthError::Missing` - empty credential
    /// - `AuthError::Malformed` - not a parseable token, or an unusable subject
    /// - `AuthError::BadSignature` - signed with a different secret
    /// - `AuthError::Expired` - `exp` is in the past (beyond the leeway)
    pub fn verify(&self, credential: &str) -> Result<Identity, AuthError> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AuthError::Missing);
        }

        let data = decode::<Claims>(credential, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::BadSignature,
                _ => AuthError::Malformed,
            },
        )?;

        let subject = data.claims.sub.as_str();
        // The system sentinel can never be a connection identity
        if subject.is_empty() || subject.trim() != subject || subject == SYSTEM_SENDER {
            return Err(AuthError::Malformed);
        }
        Ok(Identity::new(subject))
    }

    /// Sign claims with the server secret
    pub fn sign(&self, claims: &Claims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
    }

    /// Issue a token for `username` valid for `ttl_secs`
    pub fn issue_token(&self, username: &str, ttl_secs: u64) -> Result<String, jsonwebtoken::errors::Error> {
        self.sign(&Claims::for_user(username, ttl_secs))
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header value
pub fn bearer_token(header_value: &str) -> Option<&str> {
    header_value
        .strip_prefix("Bearer ")
        .or_else(|| header_value.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
