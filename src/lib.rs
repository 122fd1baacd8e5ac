//! Rolegate - Main Library
//!
//! Rolegate authenticates users and authorizes their actions against a
//! PostgreSQL store of user and role records, using short-lived, stateless
//! signed tokens.
//!
//! # Module Structure
//!
//! - **`shared`** - Types shared by every layer
//!   - `User`, `Role`, `DisplayName`
//!   - Input validation errors
//!   - Application configuration and the signing secret
//!
//! - **`backend`** - Server-side code
//!   - Token codec, credential verifier, user directory, session service
//!   - Authorization gate middleware
//!   - Axum router, handlers and application state
//!
//! # Usage
//!
//! ```rust,no_run
//! use rolegate::backend::server::init::create_app;
//! use rolegate::shared::AppConfig;
//!
//! # async fn example(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
//! let (app, pool) = create_app(&config).await?;
//! // Serve `app` with axum, close `pool` on shutdown
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! Request handlers share an immutable `TokenCodec` and a `PgPool` behind
//! `Arc`; neither holds per-request mutable state.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
