//! Authentication Handlers Module
//!
//! HTTP handlers for the `/api/v1` surface. Handlers stay thin: they extract
//! the request, call the `SessionService` and shape the response. Role checks
//! happen in the gate middleware before a handler runs.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs      - Module exports and documentation
//! ├── extract.rs  - Json/Path/Query wrappers with JSON rejections
//! ├── types.rs    - Request and response types
//! ├── login.rs    - Login and refresh
//! ├── signup.rs   - Registration (gated and open)
//! ├── users.rs    - User lookup, search, edit and delete
//! └── me.rs       - Caller's profile and password
//! ```

/// Extractors that reject with `BackendError`
pub mod extract;

/// Request and response types
pub mod types;

/// Login and refresh handlers
pub mod login;

/// Registration handlers
pub mod signup;

/// User management handlers
pub mod users;

/// Profile handlers
pub mod me;

pub use login::{login, refresh};
pub use me::{change_password, get_profile};
pub use signup::{register, register_force};
pub use users::{delete_user, edit_user, find_users, get_user};
