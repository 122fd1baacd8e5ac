/**
 * Login Handlers
 *
 * `POST /api/v1/login` and `POST /api/v1/refresh`.
 *
 * # Security
 *
 * - Unknown ids and wrong passwords return the same 401 body
 * - Refresh accepts only refresh tokens; access tokens get the same 401 as a
 *   forged token
 * - Passwords and tokens are never logged
 */

use std::sync::Arc;

use axum::{extract::State, response::Json};

use crate::backend::auth::handlers::extract::ApiJson;
use crate::backend::auth::handlers::types::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse,
};
use crate::backend::auth::service::SessionService;
use crate::backend::error::BackendError;

/// Login handler
///
/// # Example Request
///
/// ```http
/// POST /api/v1/login HTTP/1.1
/// Content-Type: application/json
///
/// {
///   "user_id": 7,
///   "password": "secret"
/// }
/// ```
///
/// # Example Response
///
/// ```json
/// {
///   "id": 7,
///   "email": "seven@example.com",
///   "name": "SEVEN",
///   "roles": ["ADMIN"],
///   "access_token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "refresh_token": "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...",
///   "expired": 1767225600
/// }
/// ```
pub async fn login(
    State(sessions): State<Arc<SessionService>>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, BackendError> {
    tracing::info!("Login request for user {}", request.user_id);

    let outcome = sessions.login(request.user_id, &request.password).await?;
    Ok(Json(outcome.into()))
}

/// Refresh handler
///
/// Returns a new access token with `fresh = false`.
pub async fn refresh(
    State(sessions): State<Arc<SessionService>>,
    ApiJson(request): ApiJson<RefreshRequest>,
) -> Result<Json<RefreshResponse>, BackendError> {
    let token = sessions.refresh(&request.refresh_token).await?;
    Ok(Json(token.into()))
}
