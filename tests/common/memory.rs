//! In-memory user directory
//!
//! Mirrors the PostgreSQL directory's observable behavior: unique ids and
//! emails, not-found on zero rows, keyset pagination ordered by id.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rolegate::backend::auth::users::{UserReader, UserWriter};
use rolegate::backend::error::BackendError;
use rolegate::shared::{User, UserId};

#[derive(Default)]
pub struct InMemoryDirectory {
    users: Mutex<BTreeMap<UserId, User>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a user as-is, bypassing validation
    pub fn put(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn stored(&self, id: UserId) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserReader for InMemoryDirectory {
    async fn get(&self, id: UserId) -> Result<Option<User>, BackendError> {
        Ok(self.stored(id))
    }

    async fn find_with_cursor(
        &self,
        search: &str,
        limit: i64,
        cursor: UserId,
    ) -> Result<Vec<User>, BackendError> {
        let search = search.to_uppercase();
        let users = self.users.lock().unwrap();
        Ok(users
            .range(cursor + 1..)
            .map(|(_, user)| user)
            .filter(|user| user.name.as_str().contains(&search))
            .take(limit as usize)
            .map(|user| User {
                password_digest: String::new(),
                ..user.clone()
            })
            .collect())
    }
}

#[async_trait]
impl UserWriter for InMemoryDirectory {
    async fn insert(&self, user: &User) -> Result<UserId, BackendError> {
        if user.roles.is_empty() {
            return Err(BackendError::validation("roles", "role set cannot be empty"));
        }
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.id) {
            return Err(BackendError::validation("users_pkey", "duplicate id"));
        }
        if users.values().any(|u| u.email == user.email) {
            return Err(BackendError::validation("users_email_key", "duplicate email"));
        }
        users.insert(user.id, user.clone());
        Ok(user.id)
    }

    async fn edit(&self, user: &User) -> Result<User, BackendError> {
        if user.roles.is_empty() {
            return Err(BackendError::validation("roles", "role set cannot be empty"));
        }
        let mut users = self.users.lock().unwrap();
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| BackendError::not_found(format!("user {} not found", user.id)))?;

        stored.email = user.email.clone();
        stored.name = user.name.clone();
        stored.roles = user.roles.clone();
        stored.updated_at = user.updated_at.max(stored.updated_at + 1);

        Ok(User {
            password_digest: String::new(),
            ..stored.clone()
        })
    }

    async fn change_password(&self, user: &User) -> Result<(), BackendError> {
        let mut users = self.users.lock().unwrap();
        let stored = users
            .get_mut(&user.id)
            .ok_or_else(|| BackendError::not_found(format!("user {} not found", user.id)))?;
        stored.password_digest = user.password_digest.clone();
        stored.updated_at = user.updated_at.max(stored.updated_at + 1);
        Ok(())
    }

    async fn delete(&self, id: UserId) -> Result<(), BackendError> {
        self.users
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| BackendError::not_found(format!("user {} not found", id)))
    }
}
