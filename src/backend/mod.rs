//! Backend Module
//!
//! This module contains all server-side code: the token codec, the
//! credential verifier, the PostgreSQL user directory, the session service
//! that orchestrates them, the authorization gate middleware and the axum
//! HTTP surface.
//!
//! # Architecture
//!
//! - **`server`** - Application state, configuration loading, app creation
//! - **`routes`** - Router assembly and per-route authorization
//! - **`auth`** - Tokens, passwords, user directory, session service, handlers
//! - **`middleware`** - Authorization gate
//! - **`error`** - Backend error taxonomy and HTTP conversion
//!
//! # Request Flow
//!
//! inbound request → authorization gate decodes the bearer token and checks
//! roles → handler calls the session service → user directory runs SQL
//! under a bounded timeout, inside a transaction for multi-statement writes
//! → token codec mints tokens where required → JSON response.
//!
//! # Thread Safety
//!
//! The token codec and the connection pool are shared through `Arc` and
//! are read-only after startup. Each request runs on its own task.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Backend error types
pub mod error;

/// Authentication and user management
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Re-export commonly used types
pub use server::create_app;
pub use error::BackendError;
