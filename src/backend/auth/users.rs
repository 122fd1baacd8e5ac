/**
 * User Directory
 *
 * This module owns user records and their role assignments, stored across
 * the `users` table and the `users_roles` junction table.
 *
 * # Guarantees
 *
 * - A user is never persisted with zero or partial roles: `insert` and
 *   `edit` run every statement on one connection inside one transaction
 *   and roll back on any failure
 * - Reads use the shared pool without a transaction
 * - Every operation is bounded by a fixed timeout; when it fires the
 *   in-flight future is dropped, which also drops (and rolls back) any open
 *   transaction, and the caller gets `BackendError::TimeoutError`
 * - Waiting on an exhausted pool counts against the same bound and ends in
 *   the same `TimeoutError`
 *
 * # Role Replacement
 *
 * `edit` replaces roles by deleting every junction row for the user and
 * re-inserting the new set. Inside the transaction this is atomic for
 * writers, but a concurrent reader running at READ COMMITTED can observe
 * the user with no roles for the duration of the transaction. `get` callers
 * treat an empty role set as not-found.
 */

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{FromRow, PgConnection, PgPool, Postgres, QueryBuilder, Transaction};

use crate::backend::error::BackendError;
use crate::shared::{DisplayName, Role, User, UserId};

/// Read side of the user directory
#[async_trait]
pub trait UserReader: Send + Sync {
    /// Get a user and every role they hold
    ///
    /// # Returns
    /// `None` if no user row exists. A user row without junction rows comes
    /// back with an empty role set.
    async fn get(&self, id: UserId) -> Result<Option<User>, BackendError>;

    /// Keyset pagination over users ordered by id
    ///
    /// # Arguments
    /// * `search` - case-insensitive substring of the name; empty matches all
    /// * `limit` - maximum number of users returned
    /// * `cursor` - only users with `id > cursor` are returned
    ///
    /// # Returns
    /// Users with their role sets; empty once the listing is exhausted
    async fn find_with_cursor(
        &self,
        search: &str,
        limit: i64,
        cursor: UserId,
    ) -> Result<Vec<User>, BackendError>;
}

/// Write side of the user directory
///
/// `edit` and `change_password` store `updated_at` as the later of the given
/// stamp and the previous stamp plus one second, so every write moves it
/// forward.
#[async_trait]
pub trait UserWriter: Send + Sync {
    /// Insert a user and its roles atomically; returns the stored id
    async fn insert(&self, user: &User) -> Result<UserId, BackendError>;

    /// Update email, name, timestamp and replace the role set atomically
    async fn edit(&self, user: &User) -> Result<User, BackendError>;

    /// Update the password digest and timestamp
    async fn change_password(&self, user: &User) -> Result<(), BackendError>;

    /// Delete a user; junction rows cascade
    async fn delete(&self, id: UserId) -> Result<(), BackendError>;
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    #[sqlx(default)]
    password_digest: String,
    created_at: i64,
    updated_at: i64,
}

impl UserRow {
    fn into_user(self, roles: BTreeSet<Role>) -> User {
        User {
            id: self.id,
            email: self.email,
            name: DisplayName::new(self.name),
            password_digest: self.password_digest,
            roles,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRoleRow {
    #[sqlx(flatten)]
    user: UserRow,
    role_name: Option<String>,
}

/// PostgreSQL-backed user directory
#[derive(Debug, Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
    timeout: Duration,
}

impl PgUserDirectory {
    /// # Arguments
    /// * `pool` - Database connection pool
    /// * `timeout` - Ceiling for every operation
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    async fn bounded<T, F>(&self, operation: &'static str, fut: F) -> Result<T, BackendError>
    where
        F: Future<Output = Result<T, BackendError>> + Send,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .unwrap_or_else(|_| {
                tracing::warn!("User directory {} exceeded {:?}", operation, self.timeout);
                Err(BackendError::TimeoutError(self.timeout))
            })
            .map_err(|e| pool_timeout_as_timeout(operation, e, self.timeout))
    }
}

/// An exhausted pool counts against the operation's time bound
fn pool_timeout_as_timeout(operation: &str, err: BackendError, timeout: Duration) -> BackendError {
    match err {
        BackendError::StorageError(sqlx::Error::PoolTimedOut) => {
            tracing::warn!("User directory {} got no connection within {:?}", operation, timeout);
            BackendError::TimeoutError(timeout)
        }
        other => other,
    }
}

#[async_trait]
impl UserReader for PgUserDirectory {
    async fn get(&self, id: UserId) -> Result<Option<User>, BackendError> {
        self.bounded("get", async {
            let rows = sqlx::query_as::<_, UserRoleRow>(
                r#"
                SELECT u.id, u.email, u.name, u.password_digest, u.created_at, u.updated_at, r.role_name
                FROM users u
                LEFT JOIN users_roles r ON r.users_id = u.id
                WHERE u.id = $1
                "#,
            )
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

            fold_user_rows(rows)
        })
        .await
    }

    async fn find_with_cursor(
        &self,
        search: &str,
        limit: i64,
        cursor: UserId,
    ) -> Result<Vec<User>, BackendError> {
        self.bounded("find_with_cursor", async {
            let mut builder = QueryBuilder::<Postgres>::new(
                "SELECT id, email, name, created_at, updated_at FROM users WHERE id > ",
            );
            builder.push_bind(cursor);
            if !search.is_empty() {
                builder
                    .push(" AND name ILIKE ")
                    .push_bind(format!("%{}%", escape_like(search)));
            }
            builder.push(" ORDER BY id ASC LIMIT ").push_bind(limit);

            let rows: Vec<UserRow> = builder.build_query_as().fetch_all(&self.pool).await?;
            if rows.is_empty() {
                return Ok(Vec::new());
            }

            let ids: Vec<i64> = rows.iter().map(|row| row.id).collect();
            let role_rows = sqlx::query_as::<_, (i64, String)>(
                "SELECT users_id, role_name FROM users_roles WHERE users_id = ANY($1)",
            )
            .bind(&ids[..])
            .fetch_all(&self.pool)
            .await?;

            attach_roles(rows, role_rows)
        })
        .await
    }
}

#[async_trait]
impl UserWriter for PgUserDirectory {
    async fn insert(&self, user: &User) -> Result<UserId, BackendError> {
        ensure_roles(user)?;

        self.bounded("insert", async {
            let mut tx = self.pool.begin().await?;
            match insert_user_rows(&mut tx, user).await {
                Ok(id) => {
                    tx.commit().await?;
                    tracing::info!("Inserted user {} with roles {:?}", id, user.roles);
                    Ok(id)
                }
                Err(e) => {
                    rollback(tx).await;
                    Err(e)
                }
            }
        })
        .await
    }

    async fn edit(&self, user: &User) -> Result<User, BackendError> {
        ensure_roles(user)?;

        self.bounded("edit", async {
            let mut tx = self.pool.begin().await?;
            match edit_user_rows(&mut tx, user).await {
                Ok(edited) => {
                    tx.commit().await?;
                    tracing::info!("Edited user {}", edited.id);
                    Ok(edited)
                }
                Err(e) => {
                    rollback(tx).await;
                    Err(e)
                }
            }
        })
        .await
    }

    async fn change_password(&self, user: &User) -> Result<(), BackendError> {
        self.bounded("change_password", async {
            let result = sqlx::query(
                r#"
                UPDATE users
                SET password_digest = $1, updated_at = GREATEST($2, updated_at + 1)
                WHERE id = $3
                "#,
            )
            .bind(&user.password_digest)
            .bind(user.updated_at)
            .bind(user.id)
            .execute(&self.pool)
            .await?;

            if result.rows_affected() == 0 {
                return Err(BackendError::not_found(format!("user {} not found", user.id)));
            }
            Ok(())
        })
        .await
    }

    async fn delete(&self, id: UserId) -> Result<(), BackendError> {
        self.bounded("delete", async {
            let result = sqlx::query("DELETE FROM users WHERE id = $1")
                .bind(id)
                .execute(&self.pool)
                .await?;

            if result.rows_affected() == 0 {
                return Err(BackendError::not_found(format!("user {} not found", id)));
            }
            tracing::info!("Deleted user {}", id);
            Ok(())
        })
        .await
    }
}

fn ensure_roles(user: &User) -> Result<(), BackendError> {
    if user.roles.is_empty() {
        return Err(BackendError::validation("roles", "role set cannot be empty"));
    }
    Ok(())
}

async fn rollback(tx: Transaction<'_, Postgres>) {
    if let Err(e) = tx.rollback().await {
        tracing::warn!("Rollback failed: {:?}", e);
    }
}

async fn insert_user_rows(conn: &mut PgConnection, user: &User) -> Result<UserId, BackendError> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (id, email, name, password_digest, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id
        "#,
    )
    .bind(user.id)
    .bind(&user.email)
    .bind(user.name.as_str())
    .bind(&user.password_digest)
    .bind(user.created_at)
    .bind(user.updated_at)
    .fetch_one(&mut *conn)
    .await?;

    insert_roles(conn, id, &user.roles).await?;
    Ok(id)
}

async fn edit_user_rows(conn: &mut PgConnection, user: &User) -> Result<User, BackendError> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET email = $1, name = $2, updated_at = GREATEST($3, users.updated_at + 1)
        WHERE id = $4
        RETURNING id, email, name, created_at, updated_at
        "#,
    )
    .bind(&user.email)
    .bind(user.name.as_str())
    .bind(user.updated_at)
    .bind(user.id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| BackendError::not_found(format!("user {} not found", user.id)))?;

    sqlx::query("DELETE FROM users_roles WHERE users_id = $1")
        .bind(user.id)
        .execute(&mut *conn)
        .await?;

    insert_roles(conn, row.id, &user.roles).await?;
    Ok(row.into_user(user.roles.clone()))
}

async fn insert_roles(
    conn: &mut PgConnection,
    user_id: UserId,
    roles: &BTreeSet<Role>,
) -> Result<(), BackendError> {
    let mut builder = QueryBuilder::<Postgres>::new("INSERT INTO users_roles (users_id, role_name) ");
    builder.push_values(roles.iter(), |mut row, role| {
        row.push_bind(user_id).push_bind(role.as_str());
    });
    builder.build().execute(&mut *conn).await?;
    Ok(())
}

fn parse_role(user_id: UserId, name: &str) -> Result<Role, BackendError> {
    name.parse::<Role>().map_err(|_| {
        tracing::error!("User {} has unknown stored role '{}'", user_id, name);
        BackendError::internal(format!("unknown stored role '{}'", name))
    })
}

/// Collapse joined user/role rows into one user
fn fold_user_rows(rows: Vec<UserRoleRow>) -> Result<Option<User>, BackendError> {
    let mut rows = rows.into_iter();
    let Some(first) = rows.next() else {
        return Ok(None);
    };

    let mut roles = BTreeSet::new();
    let user_id = first.user.id;
    for role_name in std::iter::once(first.role_name).chain(rows.map(|row| row.role_name)) {
        if let Some(name) = role_name {
            roles.insert(parse_role(user_id, &name)?);
        }
    }

    Ok(Some(first.user.into_user(roles)))
}

/// Match batched `(users_id, role_name)` pairs back onto their users
fn attach_roles(
    rows: Vec<UserRow>,
    role_rows: Vec<(i64, String)>,
) -> Result<Vec<User>, BackendError> {
    let mut roles_by_user: HashMap<UserId, BTreeSet<Role>> = HashMap::new();
    for (user_id, name) in role_rows {
        roles_by_user
            .entry(user_id)
            .or_default()
            .insert(parse_role(user_id, &name)?);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let roles = roles_by_user.remove(&row.id).unwrap_or_default();
            row.into_user(roles)
        })
        .collect())
}

/// Escape LIKE metacharacters so the search term matches literally
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
