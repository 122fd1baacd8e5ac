/**
 * Application State Management
 *
 * This module defines the application state structure and implements
 * the necessary `FromRef` traits for Axum state extraction.
 *
 * # Thread Safety
 *
 * Everything in `AppState` is immutable after startup and shared through
 * `Arc`, so cloning the state per request is cheap and needs no locking.
 */

use std::sync::Arc;

use axum::extract::FromRef;

use crate::backend::auth::service::SessionService;
use crate::backend::auth::sessions::TokenCodec;
use crate::shared::AppConfig;

/// Application state shared by every handler
///
/// # Usage
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use axum::extract::State;
/// use rolegate::backend::auth::SessionService;
///
/// async fn handler(State(sessions): State<Arc<SessionService>>) {
///     // ...
/// }
/// ```
#[derive(Clone)]
pub struct AppState {
    /// Login, refresh and user management
    pub sessions: Arc<SessionService>,

    /// Token codec, also handed to every `RoleGate`
    pub codec: Arc<TokenCodec>,

    /// Configuration the server was started with
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(sessions: Arc<SessionService>, codec: Arc<TokenCodec>, config: AppConfig) -> Self {
        Self {
            sessions,
            codec,
            config: Arc::new(config),
        }
    }
}

impl FromRef<AppState> for Arc<SessionService> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.sessions.clone()
    }
}
