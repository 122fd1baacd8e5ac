//! Authentication test helpers
//!
//! Builds configs, codecs and services with a cheap bcrypt cost, and seeds
//! users straight into an in-memory directory.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::Router;
use rolegate::backend::auth::password::{BcryptVerifier, CredentialVerifier};
use rolegate::backend::auth::service::SessionService;
use rolegate::backend::auth::sessions::TokenCodec;
use rolegate::backend::routes::create_router;
use rolegate::backend::server::AppState;
use rolegate::shared::{AppConfig, DisplayName, JwtSecret, Role, User, UserId};

use super::memory::InMemoryDirectory;

pub const TEST_SECRET: &str = "integration-test-secret";
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn test_config(open_registration: bool) -> AppConfig {
    AppConfig::builder()
        .database_url("postgres://localhost/rolegate_test")
        .jwt_secret(JwtSecret::new(TEST_SECRET).unwrap())
        .bcrypt_cost(TEST_BCRYPT_COST)
        .open_registration(open_registration)
        .build()
        .unwrap()
}

pub fn test_codec() -> Arc<TokenCodec> {
    Arc::new(TokenCodec::new(&JwtSecret::new(TEST_SECRET).unwrap()))
}

pub fn test_verifier() -> Arc<BcryptVerifier> {
    Arc::new(BcryptVerifier::new(TEST_BCRYPT_COST))
}

/// A user whose digest matches `password`
pub fn user_with_password(id: UserId, password: &str, roles: &[Role]) -> User {
    User {
        id,
        email: format!("user{}@example.com", id),
        name: DisplayName::new(format!("user {}", id)),
        password_digest: test_verifier().hash(password).unwrap(),
        roles: roles.iter().copied().collect::<BTreeSet<_>>(),
        created_at: 1_700_000_000,
        updated_at: 1_700_000_000,
    }
}

/// Everything a service-level test needs
pub struct TestHarness {
    pub directory: Arc<InMemoryDirectory>,
    pub codec: Arc<TokenCodec>,
    pub sessions: Arc<SessionService>,
    pub config: AppConfig,
}

impl TestHarness {
    pub fn new() -> Self {
        Self::with_config(test_config(false))
    }

    pub fn with_config(config: AppConfig) -> Self {
        let directory = Arc::new(InMemoryDirectory::new());
        let codec = test_codec();
        let sessions = Arc::new(SessionService::new(
            directory.clone(),
            test_verifier(),
            codec.clone(),
            &config,
        ));
        Self {
            directory,
            codec,
            sessions,
            config,
        }
    }

    pub fn seed(&self, id: UserId, password: &str, roles: &[Role]) -> User {
        let user = user_with_password(id, password, roles);
        self.directory.put(user.clone());
        user
    }

    pub fn router(&self) -> Router {
        create_router(AppState::new(
            self.sessions.clone(),
            self.codec.clone(),
            self.config.clone(),
        ))
    }
}
