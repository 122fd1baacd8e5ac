//! Application configuration module
//!
//! `AppConfig` is built once at startup (see `backend::server::config`) and
//! passed by reference into the components that need it. Nothing reads
//! configuration through globals.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

/// Default access token validity: one day
pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 60 * 24;
/// Default refresh token validity: ten days
pub const DEFAULT_REFRESH_TOKEN_MINUTES: i64 = 60 * 24 * 10;
/// Default ceiling for a single database operation
pub const DEFAULT_DB_TIMEOUT: Duration = Duration::from_secs(3);
/// Default HTTP port
pub const DEFAULT_SERVER_PORT: u16 = 3000;

const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;

/// Token signing secret
///
/// Guaranteed non-empty. The value is never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct JwtSecret(String);

impl JwtSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(ConfigError::MissingValue("JWT_SECRET"));
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("JwtSecret(***)")
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// Token signing secret
    pub jwt_secret: JwtSecret,
    /// HTTP listen port
    pub server_port: u16,
    /// Access token validity in minutes
    pub access_token_minutes: i64,
    /// Refresh token validity in minutes
    pub refresh_token_minutes: i64,
    /// Ceiling applied to every database operation
    pub db_timeout: Duration,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Mount the unauthenticated `/register-force` route
    pub open_registration: bool,
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(ConfigError::InvalidUrl(self.database_url.clone()));
        }
        if self.access_token_minutes <= 0 {
            return Err(ConfigError::invalid(
                "ACCESS_TOKEN_MINUTES",
                self.access_token_minutes,
            ));
        }
        if self.refresh_token_minutes <= self.access_token_minutes {
            return Err(ConfigError::invalid(
                "REFRESH_TOKEN_MINUTES",
                self.refresh_token_minutes,
            ));
        }
        if self.db_timeout.is_zero() {
            return Err(ConfigError::invalid("DB_TIMEOUT_SECS", 0));
        }
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&self.bcrypt_cost) {
            return Err(ConfigError::invalid("BCRYPT_COST", self.bcrypt_cost));
        }
        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    database_url: Option<String>,
    jwt_secret: Option<JwtSecret>,
    server_port: Option<u16>,
    access_token_minutes: Option<i64>,
    refresh_token_minutes: Option<i64>,
    db_timeout: Option<Duration>,
    bcrypt_cost: Option<u32>,
    open_registration: bool,
}

impl AppConfigBuilder {
    pub fn database_url(mut self, url: impl Into<String>) -> Self {
        self.database_url = Some(url.into());
        self
    }

    pub fn jwt_secret(mut self, secret: JwtSecret) -> Self {
        self.jwt_secret = Some(secret);
        self
    }

    pub fn server_port(mut self, port: u16) -> Self {
        self.server_port = Some(port);
        self
    }

    pub fn access_token_minutes(mut self, minutes: i64) -> Self {
        self.access_token_minutes = Some(minutes);
        self
    }

    pub fn refresh_token_minutes(mut self, minutes: i64) -> Self {
        self.refresh_token_minutes = Some(minutes);
        self
    }

    pub fn db_timeout(mut self, timeout: Duration) -> Self {
        self.db_timeout = Some(timeout);
        self
    }

    pub fn bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = Some(cost);
        self
    }

    pub fn open_registration(mut self, enabled: bool) -> Self {
        self.open_registration = enabled;
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        let config = AppConfig {
            database_url: self
                .database_url
                .ok_or(ConfigError::MissingValue("DATABASE_URL"))?,
            jwt_secret: self
                .jwt_secret
                .ok_or(ConfigError::MissingValue("JWT_SECRET"))?,
            server_port: self.server_port.unwrap_or(DEFAULT_SERVER_PORT),
            access_token_minutes: self
                .access_token_minutes
                .unwrap_or(DEFAULT_ACCESS_TOKEN_MINUTES),
            refresh_token_minutes: self
                .refresh_token_minutes
                .unwrap_or(DEFAULT_REFRESH_TOKEN_MINUTES),
            db_timeout: self.db_timeout.unwrap_or(DEFAULT_DB_TIMEOUT),
            bcrypt_cost: self.bcrypt_cost.unwrap_or(bcrypt::DEFAULT_COST),
            open_registration: self.open_registration,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl ConfigError {
    pub fn invalid(key: &'static str, value: impl fmt::Display) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
        }
    }
}
