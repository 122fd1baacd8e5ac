/**
 * Authorization Gate
 *
 * Middleware for routes that require a valid access token and, optionally,
 * one of a set of roles. It:
 *
 * 1. Extracts the bearer token from the Authorization header
 * 2. Decodes it with the `TokenCodec`
 * 3. Checks the caller's roles against the route's required roles
 * 4. Attaches the decoded `Claims` to request extensions
 *
 * A missing header, a non-Bearer scheme and any decode failure all return
 * the same 401 body. A role mismatch returns 403. No state outlives the
 * request.
 */

use std::sync::Arc;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::backend::auth::sessions::{Claims, TokenCodec, TokenError, TokenType};
use crate::backend::error::{BackendError, INVALID_TOKEN};
use crate::shared::Role;

/// Gate configuration for one route
#[derive(Clone)]
pub struct RoleGate {
    codec: Arc<TokenCodec>,
    required: Arc<[Role]>,
}

impl RoleGate {
    /// Any valid access token passes
    pub fn authenticated(codec: Arc<TokenCodec>) -> Self {
        Self::requiring(codec, &[])
    }

    /// The caller must hold at least one of `roles`
    pub fn requiring(codec: Arc<TokenCodec>, roles: &[Role]) -> Self {
        Self {
            codec,
            required: Arc::from(roles),
        }
    }
}

/// Role rule: no requirement, or a non-empty intersection
pub fn authorize(claims: &Claims, required: &[Role]) -> Result<(), BackendError> {
    if required.is_empty() || claims.has_any_role(required) {
        Ok(())
    } else {
        Err(BackendError::authorization("insufficient role"))
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request) -> Result<&str, BackendError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| {
            tracing::warn!("Missing Authorization header");
            BackendError::authentication(INVALID_TOKEN)
        })?;

    header.strip_prefix("Bearer ").ok_or_else(|| {
        tracing::warn!("Invalid Authorization header format");
        BackendError::authentication(INVALID_TOKEN)
    })
}

/// Authentication and role middleware
///
/// Use with `axum::middleware::from_fn_with_state(gate, auth_middleware)`.
/// Refresh tokens are not accepted here.
pub async fn auth_middleware(
    State(gate): State<RoleGate>,
    mut request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    let token = bearer_token(&request)?;

    let claims = gate.codec.decode(token).map_err(|e| {
        tracing::warn!("Invalid token: {}", e);
        BackendError::from(e)
    })?;

    if claims.token_type != TokenType::Access {
        tracing::warn!("Refresh token used as access token by {}", claims.identity);
        return Err(TokenError::WrongTokenType.into());
    }

    authorize(&claims, &gate.required).inspect_err(|_| {
        tracing::warn!(
            "User {} with roles {:?} lacks any of {:?}",
            claims.identity,
            claims.roles,
            gate.required
        );
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Axum extractor for the claims attached by `auth_middleware`
///
/// Only valid on gated routes; elsewhere it rejects with 401.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = BackendError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Claims>()
            .cloned()
            .map(AuthUser)
            .ok_or_else(|| {
                tracing::warn!("Claims not found in request extensions");
                BackendError::authentication(INVALID_TOKEN)
            })
    }
}
