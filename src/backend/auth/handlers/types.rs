/**
 * Authentication Handler Types
 *
 * Request and response bodies of the `/api/v1` surface. Requests convert into
 * the session service's input types; responses never carry password digests.
 */

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use crate::backend::auth::service::{LoginOutcome, NewUser, UserChanges};
use crate::backend::auth::sessions::IssuedToken;
use crate::shared::{DisplayName, Role, UserId};

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub user_id: UserId,
    pub password: String,
}

/// Login response
///
/// `expired` is the access token's expiry in Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub id: UserId,
    pub email: String,
    pub name: DisplayName,
    pub roles: BTreeSet<Role>,
    pub access_token: String,
    pub refresh_token: String,
    pub expired: i64,
}

impl From<LoginOutcome> for LoginResponse {
    fn from(outcome: LoginOutcome) -> Self {
        Self {
            id: outcome.user.id,
            email: outcome.user.email,
            name: outcome.user.name,
            roles: outcome.user.roles,
            access_token: outcome.access.token,
            refresh_token: outcome.refresh.token,
            expired: outcome.access.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    pub expired: i64,
}

impl From<IssuedToken> for RefreshResponse {
    fn from(token: IssuedToken) -> Self {
        Self {
            access_token: token.token,
            expired: token.expires_at,
        }
    }
}

/// Registration request
///
/// Roles arrive as a list; duplicates collapse on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password: String,
    pub roles: Vec<Role>,
}

impl From<RegisterRequest> for NewUser {
    fn from(request: RegisterRequest) -> Self {
        Self {
            id: request.id,
            email: request.email,
            name: request.name,
            password: request.password,
            roles: request.roles.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub id: UserId,
}

/// Edit request; the id comes from the path
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditUserRequest {
    pub email: String,
    pub name: String,
    pub roles: Vec<Role>,
}

impl EditUserRequest {
    pub fn into_changes(self, id: UserId) -> UserChanges {
        UserChanges {
            id,
            email: self.email,
            name: self.name,
            roles: self.roles.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Query string of `GET /users`
///
/// `limit` and `last_id` that are empty or not integers count as absent, so
/// `?search=&limit=&last_id=` lists the first page with the default size.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindUsersQuery {
    pub search: Option<String>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub limit: Option<i64>,
    #[serde(default, deserialize_with = "lenient_integer")]
    pub last_id: Option<UserId>,
}

fn lenient_integer<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| value.trim().parse().ok()))
}
