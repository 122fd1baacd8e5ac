//! Database test fixtures
//!
//! PostgreSQL-backed tests call `TestDatabase::connect()` and return early
//! when it yields `None`, so the suite still passes on machines without a
//! database.

use std::time::Duration;

use rolegate::backend::auth::users::PgUserDirectory;
use sqlx::PgPool;

pub struct TestDatabase {
    pool: PgPool,
}

impl TestDatabase {
    /// Connect to `DATABASE_URL`, migrate and truncate
    pub async fn connect() -> Option<Self> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping database test");
            return None;
        };

        let pool = PgPool::connect(&database_url)
            .await
            .expect("Failed to create test database pool");
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let db = Self { pool };
        db.cleanup().await;
        Some(db)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn directory(&self) -> PgUserDirectory {
        PgUserDirectory::new(self.pool.clone(), Duration::from_secs(3))
    }

    pub async fn cleanup(&self) {
        sqlx::query("TRUNCATE TABLE users_roles, users")
            .execute(&self.pool)
            .await
            .expect("Failed to clean up test data");
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .expect("Failed to count rows")
    }
}
