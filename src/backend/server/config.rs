/**
 * Server Configuration
 *
 * Loading of `AppConfig` from the environment and creation of the database
 * pool.
 *
 * # Configuration Sources
 *
 * Variables come from the process environment; the binary loads a `.env`
 * file first if one is present. Required values (`DATABASE_URL`,
 * `JWT_SECRET`) have no defaults and their absence stops startup.
 *
 * | Variable                | Default        |
 * |-------------------------|----------------|
 * | `DATABASE_URL`          | required       |
 * | `JWT_SECRET`            | required       |
 * | `SERVER_PORT`           | 3000           |
 * | `ACCESS_TOKEN_MINUTES`  | 1440           |
 * | `REFRESH_TOKEN_MINUTES` | 14400          |
 * | `DB_TIMEOUT_SECS`       | 3              |
 * | `BCRYPT_COST`           | bcrypt default |
 * | `OPEN_REGISTRATION`     | false          |
 */

use std::str::FromStr;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::backend::error::BackendError;
use crate::shared::{AppConfig, ConfigError, JwtSecret};

/// Load configuration from the process environment
pub fn load_config() -> Result<AppConfig, ConfigError> {
    config_from_lookup(|key| std::env::var(key).ok())
}

/// Build configuration from any key/value source
///
/// # Example
///
/// ```rust
/// use rolegate::backend::server::config::config_from_lookup;
///
/// let config = config_from_lookup(|key| match key {
///     "DATABASE_URL" => Some("postgres://localhost/rolegate".to_string()),
///     "JWT_SECRET" => Some("change-me".to_string()),
///     _ => None,
/// })
/// .unwrap();
/// assert_eq!(config.server_port, 3000);
/// ```
pub fn config_from_lookup<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let secret = lookup("JWT_SECRET").ok_or(ConfigError::MissingValue("JWT_SECRET"))?;
    let mut builder = AppConfig::builder().jwt_secret(JwtSecret::new(secret)?);

    if let Some(url) = lookup("DATABASE_URL") {
        builder = builder.database_url(url);
    }
    if let Some(port) = parse_var::<u16, _>(&lookup, "SERVER_PORT")? {
        builder = builder.server_port(port);
    }
    if let Some(minutes) = parse_var::<i64, _>(&lookup, "ACCESS_TOKEN_MINUTES")? {
        builder = builder.access_token_minutes(minutes);
    }
    if let Some(minutes) = parse_var::<i64, _>(&lookup, "REFRESH_TOKEN_MINUTES")? {
        builder = builder.refresh_token_minutes(minutes);
    }
    if let Some(secs) = parse_var::<u64, _>(&lookup, "DB_TIMEOUT_SECS")? {
        builder = builder.db_timeout(Duration::from_secs(secs));
    }
    if let Some(cost) = parse_var::<u32, _>(&lookup, "BCRYPT_COST")? {
        builder = builder.bcrypt_cost(cost);
    }
    if let Some(raw) = lookup("OPEN_REGISTRATION") {
        builder = builder.open_registration(parse_flag("OPEN_REGISTRATION", &raw)?);
    }

    builder.build()
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::invalid(key, raw)),
    }
}

fn parse_flag(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(ConfigError::invalid(key, raw)),
    }
}

/// Connect the pool and run migrations
///
/// Pool acquisition shares the per-operation timeout, so a saturated pool
/// fails as fast as a slow query.
///
/// # Errors
///
/// Connection and migration failures are fatal; the server does not start
/// without its schema.
pub async fn load_database(config: &AppConfig) -> Result<PgPool, BackendError> {
    tracing::info!("Connecting to database...");

    let pool = PgPoolOptions::new()
        .acquire_timeout(config.db_timeout)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Database connection pool created successfully");

    tracing::info!("Running database migrations...");
    sqlx::migrate!().run(&pool).await.map_err(|e| {
        tracing::error!("Failed to run database migrations: {}", e);
        BackendError::internal("database migrations failed")
    })?;
    tracing::info!("Database migrations completed successfully");

    Ok(pool)
}
