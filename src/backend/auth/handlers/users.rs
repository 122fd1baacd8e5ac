/**
 * User Management Handlers
 *
 * `GET /api/v1/users`, `GET /api/v1/users/{id}` (any valid token) and
 * `PUT`/`DELETE /api/v1/users/{id}` (ADMIN).
 */

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Json};

use crate::backend::auth::handlers::extract::{ApiJson, ApiPath, ApiQuery};
use crate::backend::auth::handlers::types::{EditUserRequest, FindUsersQuery};
use crate::backend::auth::service::SessionService;
use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::shared::{User, UserId};

pub async fn get_user(
    State(sessions): State<Arc<SessionService>>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<Json<User>, BackendError> {
    Ok(Json(sessions.get_user(id).await?))
}

/// One page of users ordered by id
///
/// Pass the last id of a page as `last_id` to get the next one; an empty
/// array means the listing is exhausted.
pub async fn find_users(
    State(sessions): State<Arc<SessionService>>,
    ApiQuery(query): ApiQuery<FindUsersQuery>,
) -> Result<Json<Vec<User>>, BackendError> {
    let users = sessions
        .find_users(query.search.as_deref(), query.limit, query.last_id)
        .await?;
    Ok(Json(users))
}

pub async fn edit_user(
    AuthUser(claims): AuthUser,
    State(sessions): State<Arc<SessionService>>,
    ApiPath(id): ApiPath<UserId>,
    ApiJson(request): ApiJson<EditUserRequest>,
) -> Result<Json<User>, BackendError> {
    tracing::info!("User {} editing user {}", claims.identity, id);
    Ok(Json(sessions.edit_user(request.into_changes(id)).await?))
}

/// Delete a user
///
/// # Errors
///
/// * `400 Bad Request` - The caller tried to delete their own account
/// * `404 Not Found` - No such user
pub async fn delete_user(
    AuthUser(claims): AuthUser,
    State(sessions): State<Arc<SessionService>>,
    ApiPath(id): ApiPath<UserId>,
) -> Result<StatusCode, BackendError> {
    sessions.delete_user(claims.identity, id).await?;
    tracing::info!("User {} deleted user {}", claims.identity, id);
    Ok(StatusCode::NO_CONTENT)
}
