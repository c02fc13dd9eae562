//! Authentication Module
//!
//! This module turns bearer credentials into identities and binds those
//! identities to live connections.
//!
//! # Architecture
//!
//! - **`sessions`** - Identity Verifier (JWT signature and expiry checks)
//! - **`connection`** - Connection Authenticator (per-connection state
//!   machine and the connection-to-identity registry)
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── sessions.rs     - Token verification
//! └── connection.rs   - Connection state machine and registry
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Handshake**: the credential arrives on the upgrade request or in the
//!    first `connect` frame
//! 2. **Verify**: `TokenVerifier::verify` yields an `Identity` or an `AuthError`
//! 3. **Bind**: the identity is recorded against the connection id
//! 4. **Gate**: every later frame is processed under the bound identity, or
//!    dropped if there is none
//!
//! HTTP routes authenticate per request through
//! `backend::middleware::auth_middleware`, using the same verifier.

/// JWT token verification
pub mod sessions;

/// Connection state machine
pub mod connection;

pub use connection::{Connection, ConnectionAuthenticator, ConnectionId, ConnectionRegistry, ConnectionState};
pub use sessions::{bearer_token, Claims, TokenVerifier};
