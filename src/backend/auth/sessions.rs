/**
 * Session Tokens
 *
 * This module issues and verifies the signed, self-contained session tokens
 * carried by every authenticated request.
 *
 * # Wire Format
 *
 * HS256 JWT with the payload
 * `{identity, name, roles, exp, type, fresh}` where `type` is `0` for access
 * tokens and `1` for refresh tokens.
 *
 * # Verification
 *
 * 1. The header must name HS256; any other algorithm (or an unreadable
 *    header) is an invalid signature
 * 2. The signature must verify against the server secret
 * 3. `exp` must be present and in the future (no leeway)
 * 4. The payload must deserialize into `Claims` in one step; a missing or
 *    mistyped field fails the whole token
 */

use std::collections::BTreeSet;

use chrono::{TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::{JwtSecret, Role, User, UserId};

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Token codec failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    SigningFailure(String),
    #[error("token signature is invalid")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token claims are malformed")]
    MalformedClaims,
    #[error("token has the wrong type for this operation")]
    WrongTokenType,
}

impl From<jsonwebtoken::errors::Error> for TokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::InvalidKeyFormat => TokenError::InvalidSignature,
            _ => TokenError::MalformedClaims,
        }
    }
}

/// Access or refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum TokenType {
    Access,
    Refresh,
}

impl From<TokenType> for u8 {
    fn from(token_type: TokenType) -> Self {
        match token_type {
            TokenType::Access => 0,
            TokenType::Refresh => 1,
        }
    }
}

impl TryFrom<u8> for TokenType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(TokenType::Access),
            1 => Ok(TokenType::Refresh),
            other => Err(format!("unknown token type {}", other)),
        }
    }
}

/// Claims carried inside every token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub identity: UserId,
    /// Display name at issue time
    pub name: String,
    /// Role set at issue time
    pub roles: BTreeSet<Role>,
    /// Expiration time (Unix timestamp), set by `TokenCodec::issue`
    pub exp: i64,
    /// Access or refresh
    #[serde(rename = "type")]
    pub token_type: TokenType,
    /// Issued straight from a password login
    pub fresh: bool,
}

impl Claims {
    /// Access token claims for `user`
    pub fn access(user: &User, fresh: bool) -> Self {
        Self {
            identity: user.id,
            name: user.name.to_string(),
            roles: user.roles.clone(),
            exp: 0,
            token_type: TokenType::Access,
            fresh,
        }
    }

    /// Refresh token claims for `user`; never fresh
    pub fn refresh(user: &User) -> Self {
        Self {
            token_type: TokenType::Refresh,
            ..Self::access(user, false)
        }
    }

    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        roles.iter().any(|role| self.roles.contains(role))
    }
}

/// A signed token and the instant it stops being valid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Unix seconds
    pub expires_at: i64,
}

/// Issues and verifies session tokens with a single process-wide secret
///
/// Built once at startup and shared read-only between requests.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &JwtSecret) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign `claims` with `exp = now + validity_minutes`
    pub fn issue(&self, claims: &Claims, validity_minutes: i64) -> Result<IssuedToken, TokenError> {
        let expires_at = TimeDelta::try_minutes(validity_minutes)
            .and_then(|validity| Utc::now().checked_add_signed(validity))
            .ok_or_else(|| {
                TokenError::SigningFailure(format!(
                    "validity of {} minutes is out of range",
                    validity_minutes
                ))
            })?
            .timestamp();

        let claims = Claims {
            exp: expires_at,
            ..claims.clone()
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| TokenError::SigningFailure(e.to_string()))?;

        Ok(IssuedToken { token, expires_at })
    }

    /// Verify `token` and return its claims
    pub fn decode(&self, token: &str) -> Result<Claims, TokenError> {
        let payload = self.verify(token)?;
        extract_claims(payload)
    }

    /// Check algorithm, signature and expiry; returns the raw payload
    fn verify(&self, token: &str) -> Result<serde_json::Value, TokenError> {
        let header = decode_header(token).map_err(|_| TokenError::InvalidSignature)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::InvalidSignature);
        }

        let data = decode::<serde_json::Value>(token, &self.decoding, &self.validation)?;
        Ok(data.claims)
    }
}

/// Deserialize a verified payload into `Claims`, all fields or nothing
pub fn extract_claims(payload: serde_json::Value) -> Result<Claims, TokenError> {
    serde_json::from_value(payload).map_err(|e| {
        tracing::debug!("Rejecting token payload: {}", e);
        TokenError::MalformedClaims
    })
}
