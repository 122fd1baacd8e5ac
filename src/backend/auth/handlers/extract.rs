/**
 * Request Extractors
 *
 * Thin wrappers over axum's `Json`, `Path` and `Query` whose rejections are
 * `BackendError`s, so a malformed body, path segment or query string gets the
 * same `{"error", "status"}` body as every other failure.
 */

use axum::extract::{FromRequest, FromRequestParts};

use crate::backend::error::BackendError;

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(BackendError))]
pub struct ApiJson<T>(pub T);

/// Typed path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(BackendError))]
pub struct ApiPath<T>(pub T);

/// Typed query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(BackendError))]
pub struct ApiQuery<T>(pub T);
