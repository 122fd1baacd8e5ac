//! Shared Module
//!
//! Types used across the token codec, the user directory, the session
//! service and the HTTP layer. Nothing in here touches the network or the
//! database.

/// User records and the static role set
pub mod user;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use user::{DisplayName, Role, User, UserId};
pub use error::SharedError;
pub use config::{AppConfig, AppConfigBuilder, ConfigError, JwtSecret};
