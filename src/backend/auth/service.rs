/**
 * Session Service
 *
 * Business operations behind the HTTP handlers: login and refresh mint tokens
 * through the `TokenCodec`; registration, edits and password changes validate
 * input, stamp timestamps and hash passwords before delegating to the user
 * directory.
 *
 * Errors from the directory and the codec pass through unchanged. The only
 * rewrite happens at login, where "no such user", "user without roles" and
 * "wrong password" all become the same authentication error.
 */

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::backend::auth::password::CredentialVerifier;
use crate::backend::auth::sessions::{Claims, IssuedToken, TokenCodec, TokenError, TokenType};
use crate::backend::auth::users::{UserReader, UserWriter};
use crate::backend::error::{BackendError, INVALID_TOKEN};
use crate::shared::{AppConfig, DisplayName, Role, SharedError, User, UserId};

/// Page size when the caller does not ask for one
pub const DEFAULT_PAGE_SIZE: i64 = 10;
/// Largest page a caller may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

const PASSWORD_MIN_LEN: usize = 3;
const PASSWORD_MAX_LEN: usize = 20;

/// Input for `register`
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password: String,
    pub roles: BTreeSet<Role>,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_profile(self.id, &self.email, &self.name, &self.roles)?;
        validate_password(&self.password)
    }
}

/// Input for `edit_user`
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub roles: BTreeSet<Role>,
}

impl UserChanges {
    pub fn validate(&self) -> Result<(), SharedError> {
        validate_profile(self.id, &self.email, &self.name, &self.roles)
    }
}

/// A successful login: the user and a fresh token pair
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub access: IssuedToken,
    pub refresh: IssuedToken,
}

/// Session and user management operations
///
/// Holds only shared, immutable collaborators; one instance serves every
/// request.
pub struct SessionService {
    reader: Arc<dyn UserReader>,
    writer: Arc<dyn UserWriter>,
    verifier: Arc<dyn CredentialVerifier>,
    codec: Arc<TokenCodec>,
    access_token_minutes: i64,
    refresh_token_minutes: i64,
}

impl SessionService {
    /// Build a service over one directory that implements both halves
    pub fn new<D>(
        directory: Arc<D>,
        verifier: Arc<dyn CredentialVerifier>,
        codec: Arc<TokenCodec>,
        config: &AppConfig,
    ) -> Self
    where
        D: UserReader + UserWriter + 'static,
    {
        Self::with_parts(
            directory.clone(),
            directory,
            verifier,
            codec,
            config.access_token_minutes,
            config.refresh_token_minutes,
        )
    }

    /// Build a service from separate read and write sides
    pub fn with_parts(
        reader: Arc<dyn UserReader>,
        writer: Arc<dyn UserWriter>,
        verifier: Arc<dyn CredentialVerifier>,
        codec: Arc<TokenCodec>,
        access_token_minutes: i64,
        refresh_token_minutes: i64,
    ) -> Self {
        Self {
            reader,
            writer,
            verifier,
            codec,
            access_token_minutes,
            refresh_token_minutes,
        }
    }

    /// Verify a password and issue a fresh access token plus a refresh token
    ///
    /// # Errors
    /// * `AuthenticationError` with `INVALID_CREDENTIALS` for an unknown id,
    ///   a user without roles or a wrong password
    /// * Storage and timeout errors pass through
    pub async fn login(&self, user_id: UserId, password: &str) -> Result<LoginOutcome, BackendError> {
        let user = match self.reader.get(user_id).await? {
            Some(user) if !user.roles.is_empty() => user,
            _ => {
                tracing::warn!("Login rejected: no usable account for id {}", user_id);
                return Err(BackendError::invalid_credentials());
            }
        };

        if !self.verifier.verify(password, &user.password_digest) {
            tracing::warn!("Login rejected: wrong password for id {}", user_id);
            return Err(BackendError::invalid_credentials());
        }

        let access = self
            .codec
            .issue(&Claims::access(&user, true), self.access_token_minutes)?;
        let refresh = self
            .codec
            .issue(&Claims::refresh(&user), self.refresh_token_minutes)?;

        tracing::info!("User {} logged in", user.id);
        Ok(LoginOutcome {
            user,
            access,
            refresh,
        })
    }

    /// Exchange a refresh token for a new, non-fresh access token
    ///
    /// Roles come from storage, not from the refresh token, so role changes
    /// take effect on the next refresh.
    pub async fn refresh(&self, refresh_token: &str) -> Result<IssuedToken, BackendError> {
        let claims = self.codec.decode(refresh_token)?;
        if claims.token_type != TokenType::Refresh {
            tracing::warn!("Refresh rejected: access token presented by {}", claims.identity);
            return Err(TokenError::WrongTokenType.into());
        }

        let user = match self.reader.get(claims.identity).await? {
            Some(user) if !user.roles.is_empty() => user,
            _ => {
                tracing::warn!("Refresh rejected: user {} no longer exists", claims.identity);
                return Err(BackendError::authentication(INVALID_TOKEN));
            }
        };

        let token = self
            .codec
            .issue(&Claims::access(&user, false), self.access_token_minutes)?;
        tracing::debug!("Issued refreshed access token for {}", user.id);
        Ok(token)
    }

    /// Hash the password, stamp timestamps and insert
    pub async fn register(&self, new_user: NewUser) -> Result<UserId, BackendError> {
        new_user.validate()?;

        let now = now_seconds();
        let user = User {
            id: new_user.id,
            email: new_user.email,
            name: DisplayName::new(new_user.name),
            password_digest: self.verifier.hash(&new_user.password)?,
            roles: new_user.roles,
            created_at: now,
            updated_at: now,
        };

        let id = self.writer.insert(&user).await?;
        tracing::info!("Registered user {}", id);
        Ok(id)
    }

    /// Replace email, name and roles; returns the stored record
    pub async fn edit_user(&self, changes: UserChanges) -> Result<User, BackendError> {
        changes.validate()?;

        let user = User {
            id: changes.id,
            email: changes.email,
            name: DisplayName::new(changes.name),
            password_digest: String::new(),
            roles: changes.roles,
            created_at: 0,
            updated_at: now_seconds(),
        };

        self.writer.edit(&user).await
    }

    /// Replace a user's password after checking the current one
    pub async fn change_password(
        &self,
        id: UserId,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), BackendError> {
        validate_password(new_password)?;

        let mut user = self
            .reader
            .get(id)
            .await?
            .ok_or_else(|| BackendError::not_found(format!("user {} not found", id)))?;

        if !self.verifier.verify(old_password, &user.password_digest) {
            tracing::warn!("Password change rejected: wrong password for id {}", id);
            return Err(BackendError::invalid_credentials());
        }

        user.password_digest = self.verifier.hash(new_password)?;
        user.updated_at = now_seconds();
        self.writer.change_password(&user).await?;

        tracing::info!("User {} changed password", id);
        Ok(())
    }

    /// Delete `id` on behalf of `caller`; nobody may delete themselves
    pub async fn delete_user(&self, caller: UserId, id: UserId) -> Result<(), BackendError> {
        if caller == id {
            return Err(BackendError::validation("id", "cannot delete your own account"));
        }
        self.writer.delete(id).await
    }

    /// Fetch one user; a user without roles counts as missing
    pub async fn get_user(&self, id: UserId) -> Result<User, BackendError> {
        match self.reader.get(id).await? {
            Some(user) if !user.roles.is_empty() => Ok(user),
            _ => Err(BackendError::not_found(format!("user {} not found", id))),
        }
    }

    /// One page of users after `last_id`, optionally filtered by name
    pub async fn find_users(
        &self,
        search: Option<&str>,
        limit: Option<i64>,
        last_id: Option<UserId>,
    ) -> Result<Vec<User>, BackendError> {
        let search = search.map(|s| s.trim().to_uppercase()).unwrap_or_default();
        let limit = clamp_limit(limit);
        let cursor = last_id.unwrap_or(0).max(0);

        self.reader.find_with_cursor(&search, limit, cursor).await
    }
}

fn now_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

fn validate_profile(
    id: UserId,
    email: &str,
    name: &str,
    roles: &BTreeSet<Role>,
) -> Result<(), SharedError> {
    if id <= 0 {
        return Err(SharedError::validation("id", "must be a positive integer"));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(SharedError::validation("email", "must be a valid email address"));
    }
    if name.trim().is_empty() {
        return Err(SharedError::validation("name", "cannot be empty"));
    }
    if roles.is_empty() {
        return Err(SharedError::validation("roles", "at least one role is required"));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), SharedError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(SharedError::length("password", PASSWORD_MIN_LEN, PASSWORD_MAX_LEN));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user() -> NewUser {
        NewUser {
            id: 7,
            email: "seven@example.com".to_string(),
            name: "seven".to_string(),
            password: "secret".to_string(),
            roles: BTreeSet::from([Role::Admin]),
        }
    }

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(-5)), 1);
        assert_eq!(clamp_limit(Some(42)), 42);
        assert_eq!(clamp_limit(Some(1_000)), MAX_PAGE_SIZE);
    }

    #[test]
    fn test_valid_new_user() {
        assert!(new_user().validate().is_ok());
    }

    #[test]
    fn test_new_user_rules() {
        let cases = [
            NewUser { id: 0, ..new_user() },
            NewUser { email: "".to_string(), ..new_user() },
            NewUser { email: "no-at-sign".to_string(), ..new_user() },
            NewUser { name: "  ".to_string(), ..new_user() },
            NewUser { roles: BTreeSet::new(), ..new_user() },
            NewUser { password: "ab".to_string(), ..new_user() },
            NewUser { password: "a".repeat(21), ..new_user() },
        ];
        let fields: Vec<String> = cases
            .iter()
            .map(|case| case.validate().unwrap_err().field().to_string())
            .collect();

        assert_eq!(
            fields,
            vec!["id", "email", "email", "name", "roles", "password", "password"]
        );
    }

    #[test]
    fn test_password_bounds_are_inclusive() {
        assert!(validate_password("abc").is_ok());
        assert!(validate_password(&"a".repeat(20)).is_ok());
    }

    #[test]
    fn test_changes_do_not_need_password() {
        let changes = UserChanges {
            id: 3,
            email: "x@example.com".to_string(),
            name: "x".to_string(),
            roles: BTreeSet::from([Role::Basic]),
        };
        assert!(changes.validate().is_ok());
    }
}
