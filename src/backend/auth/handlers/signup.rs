/**
 * Registration Handlers
 *
 * `POST /api/v1/register` sits behind the ADMIN gate. `register_force` is the
 * same operation without a gate; the router mounts it at
 * `POST /api/v1/register-force` only when open registration is enabled, so
 * the first administrator can be created on an empty database.
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::extract::ApiJson;
use crate::backend::auth::handlers::types::{RegisterRequest, RegisterResponse};
use crate::backend::auth::service::SessionService;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;

/// Register a user on behalf of an administrator
///
/// # Errors
///
/// * `400 Bad Request` - Invalid fields, empty role set, duplicate id or email
/// * `401 Unauthorized` / `403 Forbidden` - Rejected by the gate
pub async fn register(
    AuthUser(claims): AuthUser,
    State(sessions): State<Arc<SessionService>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), BackendError> {
    tracing::info!("User {} registering user {}", claims.identity, request.id);

    let id = sessions.register(request.into()).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}

/// Register without a token
pub async fn register_force(
    State(sessions): State<Arc<SessionService>>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), BackendError> {
    tracing::warn!("Open registration used for user {}", request.id);

    let id = sessions.register(request.into()).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { id })))
}
