/**
 * Profile Handlers
 *
 * `GET /api/v1/profile` returns the caller's own record.
 * `PUT /api/v1/profile/password` changes the caller's password and requires a
 * fresh access token, i.e. one obtained by logging in rather than by refresh.
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::extract::ApiJson;
use crate::backend::auth::handlers::types::ChangePasswordRequest;
use crate::backend::auth::service::SessionService;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::User;

pub async fn get_profile(
    AuthUser(claims): AuthUser,
    State(sessions): State<Arc<SessionService>>,
) -> Result<Json<User>, BackendError> {
    Ok(Json(sessions.get_user(claims.identity).await?))
}

/// Change password handler
///
/// # Errors
///
/// * `401 Unauthorized` - Old password does not match
/// * `403 Forbidden` - Token was issued by refresh
/// * `400 Bad Request` - New password outside the allowed length
pub async fn change_password(
    AuthUser(claims): AuthUser,
    State(sessions): State<Arc<SessionService>>,
    ApiJson(request): ApiJson<ChangePasswordRequest>,
) -> Result<StatusCode, BackendError> {
    if !claims.fresh {
        tracing::warn!("Password change by {} refused: token is not fresh", claims.identity);
        return Err(BackendError::authorization("a fresh login is required"));
    }

    sessions
        .change_password(claims.identity, &request.old_password, &request.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
