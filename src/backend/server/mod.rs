//! Server Module
//!
//! Server-side wiring for the Axum HTTP server.
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs          - Module exports and documentation
//! ├── state.rs        - AppState and FromRef implementations
//! ├── config.rs       - Environment configuration and database pool
//! └── init.rs         - Application construction
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Configuration Loading**: `config::load_config` reads the environment
//! 2. **Database**: `config::load_database` connects and migrates
//! 3. **State Creation**: `init::build_state` builds the codec, directory and
//!    session service
//! 4. **Router Creation**: `routes::router::create_router` mounts `/api/v1`
//!
//! # Example
//!
//! ```rust,no_run
//! use rolegate::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let (app, pool) = create_app(&config).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Server configuration loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{build_state, create_app};
pub use state::AppState;
