//! Middleware Module
//!
//! HTTP middleware applied to routes before they reach handlers.
//!
//! - **`auth`** - Authorization Gate: bearer token decoding and role checks
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use axum::{middleware::from_fn_with_state, routing::get, Router};
//! use rolegate::backend::auth::TokenCodec;
//! use rolegate::backend::middleware::{auth_middleware, RoleGate};
//! use rolegate::shared::{JwtSecret, Role};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let codec = Arc::new(TokenCodec::new(&JwtSecret::new("secret")?));
//! let gate = RoleGate::requiring(codec, &[Role::Admin]);
//! let router: Router = Router::new()
//!     .route("/admin", get(|| async { "ok" }))
//!     .route_layer(from_fn_with_state(gate, auth_middleware));
//! # Ok(())
//! # }
//! ```

pub mod auth;

pub use auth::{auth_middleware, authorize, AuthUser, RoleGate};
