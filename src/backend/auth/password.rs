/**
 * Credential Verification
 *
 * One-way password hashing behind a small trait, so the session service can
 * be exercised with a cheap work factor in tests.
 */

use crate::backend::error::BackendError;

/// Hash and verify passwords
pub trait CredentialVerifier: Send + Sync {
    /// Produce a digest for storage
    fn hash(&self, plaintext: &str) -> Result<String, BackendError>;

    /// Whether `plaintext` matches `digest`; a malformed digest never matches
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// bcrypt-backed verifier
#[derive(Debug, Clone, Copy)]
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl CredentialVerifier for BcryptVerifier {
    fn hash(&self, plaintext: &str) -> Result<String, BackendError> {
        bcrypt::hash(plaintext, self.cost).map_err(|e| {
            tracing::error!("Password hashing failed: {:?}", e);
            BackendError::internal("failed to hash password")
        })
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        match bcrypt::verify(plaintext, digest) {
            Ok(valid) => valid,
            Err(e) => {
                tracing::warn!("Stored password digest could not be verified: {:?}", e);
                false
            }
        }
    }
}
