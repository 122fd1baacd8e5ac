//! Authentication Module
//!
//! Token-based authentication and the user/role store behind it.
//!
//! # Architecture
//!
//! Leaf-first:
//!
//! - **`password`** - Credential Verifier, one-way hashing behind a trait
//! - **`sessions`** - Token Codec, signed self-contained session tokens
//! - **`users`** - User Directory, transactional user and role persistence
//! - **`service`** - Session Service, login/refresh and user management
//! - **`handlers`** - HTTP handlers for the `/api/v1` surface
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── password.rs     - CredentialVerifier, BcryptVerifier
//! ├── sessions.rs     - TokenCodec, Claims, TokenError
//! ├── users.rs        - UserReader, UserWriter, PgUserDirectory
//! ├── service.rs      - SessionService
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Login**: user id and password → credentials verified → fresh access
//!    token and refresh token returned
//! 2. **Request**: bearer access token → gate decodes it and checks roles →
//!    handler runs with the decoded claims
//! 3. **Refresh**: refresh token → roles re-read from storage → new access
//!    token, not fresh
//!
//! # Security
//!
//! - Passwords are hashed with bcrypt before storage
//! - Tokens are HS256 only; anything else fails closed
//! - Invalid credentials and invalid tokens each return one uniform 401 body

/// Credential verification
pub mod password;

/// Token issuing and verification
pub mod sessions;

/// User and role persistence
pub mod users;

/// Session and user management operations
pub mod service;

/// HTTP handlers for authentication endpoints
pub mod handlers;

pub use password::{BcryptVerifier, CredentialVerifier};
pub use service::{LoginOutcome, NewUser, SessionService, UserChanges};
pub use sessions::{Claims, IssuedToken, TokenCodec, TokenError, TokenType};
pub use users::{PgUserDirectory, UserReader, UserWriter};
