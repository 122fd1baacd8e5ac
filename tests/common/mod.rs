//! Common test utilities and helpers
//!
//! - In-memory user directory for service and HTTP tests
//! - Authentication helpers (config, codec, seeded users)
//! - PostgreSQL fixture, skipped when `DATABASE_URL` is unset

#![allow(dead_code)]

pub mod auth_helpers;
pub mod database;
pub mod memory;

pub use auth_helpers::*;
pub use database::*;
pub use memory::*;
