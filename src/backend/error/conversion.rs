/**
 * Error Conversion
 *
 * Conversions into and out of `BackendError`:
 *
 * - `IntoResponse`, so handlers and middleware can return `BackendError`
 *   directly
 * - `From<sqlx::Error>`, which translates recognizable constraint
 *   violations into validation errors and everything else into storage
 *   errors
 * - `From` for axum's body, path and query rejections, which keep their
 *   status code and message but take the JSON body below
 *
 * # Response Format
 *
 * ```json
 * {
 *   "error": "Error message",
 *   "status": 400
 * }
 * ```
 */

use axum::{
    body::Body,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
};
use sqlx::error::ErrorKind;

use crate::backend::error::types::BackendError;

impl IntoResponse for BackendError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = self.message();

        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        }

        let body = serde_json::json!({
            "error": message,
            "status": status.as_u16(),
        });

        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap_or_else(|_| {
                let mut fallback = Response::new(Body::from("Internal Server Error"));
                *fallback.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
                fallback
            })
    }
}

impl From<sqlx::Error> for BackendError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => BackendError::validation(
                        constraint,
                        "a record with the same value already exists",
                    ),
                    ErrorKind::ForeignKeyViolation => BackendError::validation(
                        constraint,
                        "referenced record does not exist",
                    ),
                    ErrorKind::CheckViolation | ErrorKind::NotNullViolation => {
                        BackendError::validation(constraint, "value is not allowed")
                    }
                    _ => BackendError::StorageError(err),
                }
            }
            sqlx::Error::RowNotFound => BackendError::not_found("record not found"),
            _ => BackendError::StorageError(err),
        }
    }
}

impl From<JsonRejection> for BackendError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection.body_text());
        BackendError::handler(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for BackendError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!("Rejected path: {}", rejection.body_text());
        BackendError::handler(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for BackendError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!("Rejected query string: {}", rejection.body_text());
        BackendError::handler(rejection.status(), rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::auth::sessions::TokenError;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = BackendError::not_found("user 9 not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "user 9 not found");
        assert_eq!(body["status"], 404);
    }

    #[tokio::test]
    async fn test_token_error_response_is_uniform() {
        let response = BackendError::from(TokenError::MalformedClaims).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

        let body = body_json(response).await;
        assert_eq!(body["error"], crate::backend::error::types::INVALID_TOKEN);
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let error = BackendError::from(sqlx::Error::RowNotFound);
        assert_eq!(error.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_timeout_response_is_service_unavailable() {
        let response =
            BackendError::TimeoutError(std::time::Duration::from_millis(300)).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let body = body_json(response).await;
        assert_eq!(body["error"], "storage is busy, try again later");
        assert_eq!(body["status"], 503);
    }
}
