/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * Every API route lives under `/api/v1`. Unknown paths get the same JSON
 * error body as every other failure.
 */

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state containing the session service, codec
///   and configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let api = configure_api_routes(Router::new(), &app_state);

    Router::new()
        .nest("/api/v1", api)
        .fallback(|| async { BackendError::not_found("route not found") })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
