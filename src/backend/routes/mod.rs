//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! └── api_routes.rs   - `/api/v1` routes and their gates
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use rolegate::backend::routes::create_router;
//! use rolegate::backend::server::{build_state, config::load_config};
//!
//! # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let router = create_router(build_state(pool, &config));
//! # Ok(())
//! # }
//! ```

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
