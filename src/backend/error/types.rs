/**
 * Backend Error Types
 *
 * This module defines the error taxonomy shared by the user directory, the
 * token codec, the session service and the HTTP handlers.
 *
 * # Error Categories
 *
 * - Validation (`SharedError`) - bad input, never retried
 * - Not found - zero rows affected or returned
 * - Authentication - bad credentials or an unusable token, reported with
 *   one uniform message so callers cannot tell which check failed
 * - Authorization - valid token, insufficient role
 * - Timeout / Storage / Internal - server-side failures, details are logged
 *   and never sent to clients
 *
 * Errors pass through the session service unchanged; nothing is retried.
 */

use std::time::Duration;

use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::auth::sessions::TokenError;
use crate::shared::SharedError;

/// Message returned for every failed login, whatever the cause
pub const INVALID_CREDENTIALS: &str = "invalid user id or password";

/// Message returned for every rejected token, whatever the cause
pub const INVALID_TOKEN: &str = "invalid or expired token";

const INTERNAL_MESSAGE: &str = "internal server error";

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use rolegate::backend::error::BackendError;
/// use axum::http::StatusCode;
///
/// let err = BackendError::not_found("user 7 not found");
/// assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Handler error (e.g., invalid path parameter, self-delete)
    #[error("Handler error: {message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Input validation error
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Zero rows affected or returned
    #[error("Not found: {message}")]
    NotFoundError { message: String },

    /// Bad credentials or unusable session
    #[error("Authentication failed: {message}")]
    AuthenticationError { message: String },

    /// Valid token, insufficient role or freshness
    #[error("Forbidden: {message}")]
    AuthorizationError { message: String },

    /// Token codec failure
    #[error(transparent)]
    TokenError(#[from] TokenError),

    /// A storage call exceeded its time budget
    #[error("Storage operation timed out after {0:?}")]
    TimeoutError(Duration),

    /// Driver error with no recognizable constraint behind it
    #[error("Storage error: {0}")]
    StorageError(#[source] sqlx::Error),

    /// Anything else that is the server's fault
    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SharedError(SharedError::validation(field, message))
    }

    /// Create a new not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFoundError {
            message: message.into(),
        }
    }

    /// Login failure; the message never varies
    pub fn invalid_credentials() -> Self {
        Self::AuthenticationError {
            message: INVALID_CREDENTIALS.to_string(),
        }
    }

    /// Create a new authentication error
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::AuthenticationError {
            message: message.into(),
        }
    }

    /// Create a new authorization error
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::AuthorizationError {
            message: message.into(),
        }
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `SharedError` - 400 Bad Request
    /// - `NotFoundError` - 404 Not Found
    /// - `AuthenticationError` - 401 Unauthorized
    /// - `AuthorizationError` - 403 Forbidden
    /// - `TokenError` - 401, except signing failures (500)
    /// - `TimeoutError` - 503 Service Unavailable
    /// - `StorageError`, `InternalError` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::SharedError(_) => StatusCode::BAD_REQUEST,
            Self::NotFoundError { .. } => StatusCode::NOT_FOUND,
            Self::AuthenticationError { .. } => StatusCode::UNAUTHORIZED,
            Self::AuthorizationError { .. } => StatusCode::FORBIDDEN,
            Self::TokenError(TokenError::SigningFailure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::TokenError(_) => StatusCode::UNAUTHORIZED,
            Self::TimeoutError(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::StorageError(_) | Self::InternalError { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Get the client-facing error message
    ///
    /// Token failures collapse to one message, server-side failures to a
    /// generic one.
    pub fn message(&self) -> String {
        match self {
            Self::HandlerError { message, .. }
            | Self::NotFoundError { message }
            | Self::AuthenticationError { message }
            | Self::AuthorizationError { message } => message.clone(),
            Self::SharedError(err) => err.to_string(),
            Self::TokenError(TokenError::SigningFailure(_)) => INTERNAL_MESSAGE.to_string(),
            Self::TokenError(_) => INVALID_TOKEN.to_string(),
            Self::TimeoutError(_) => "storage is busy, try again later".to_string(),
            Self::StorageError(_) | Self::InternalError { .. } => INTERNAL_MESSAGE.to_string(),
        }
    }
}
