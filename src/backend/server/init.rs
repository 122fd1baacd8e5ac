/**
 * Server Initialization
 *
 * This module wires the application together:
 *
 * 1. Connect the database pool and run migrations
 * 2. Build the token codec from the configured secret
 * 3. Build the user directory, credential verifier and session service
 * 4. Create the router
 *
 * The signing secret and the pool are created exactly once here and shared
 * read-only afterwards.
 */

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use crate::backend::auth::password::BcryptVerifier;
use crate::backend::auth::service::SessionService;
use crate::backend::auth::sessions::TokenCodec;
use crate::backend::auth::users::PgUserDirectory;
use crate::backend::error::BackendError;
use crate::backend::routes::router::create_router;
use crate::backend::server::config::load_database;
use crate::backend::server::state::AppState;
use crate::shared::AppConfig;

/// Build the application state around an existing pool
pub fn build_state(pool: PgPool, config: &AppConfig) -> AppState {
    let codec = Arc::new(TokenCodec::new(&config.jwt_secret));
    let directory = Arc::new(PgUserDirectory::new(pool, config.db_timeout));
    let verifier = Arc::new(BcryptVerifier::new(config.bcrypt_cost));

    let sessions = Arc::new(SessionService::new(
        directory,
        verifier,
        codec.clone(),
        config,
    ));

    AppState::new(sessions, codec, config.clone())
}

/// Create and configure the Axum application
///
/// # Returns
///
/// The router and the pool behind it; the caller closes the pool after the
/// server stops.
///
/// # Errors
///
/// Fails if the database is unreachable or migrations fail.
pub async fn create_app(config: &AppConfig) -> Result<(Router, PgPool), BackendError> {
    tracing::info!("Initializing rolegate backend server");

    let pool = load_database(config).await?;
    let app = create_router(build_state(pool.clone(), config));

    if config.open_registration {
        tracing::warn!("Open registration is enabled; POST /api/v1/register-force needs no token");
    }
    tracing::info!("Router configured");

    Ok((app, pool))
}
