//! Password Hashing
//!
//! Argon2id with a fresh random salt per hash. The PHC string output
//! carries the salt and cost parameters, so verification needs nothing
//! but the stored hash.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

use crate::config::AuthConfig;

#[derive(Debug, Clone, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid Argon2 parameters: {0}")]
    Params(String),

    #[error("hashing failed: {0}")]
    Hash(String),

    #[error("hashing task aborted")]
    Aborted,

    #[error("hashing timed out")]
    Timeout,
}

/// Salted one-way password hasher
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
}

impl PasswordHasher {
    /// Build a hasher with the given Argon2 cost parameters
    pub fn new(memory_cost: u32, time_cost: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = Params::new(memory_cost, time_cost, parallelism, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;

        Ok(Self { params })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, PasswordError> {
        Self::new(
            config.argon2_memory_cost,
            config.argon2_time_cost,
            config.argon2_parallelism,
        )
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash a password using Argon2id
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::Hash(e.to_string()))
    }

    /// Verify a password against a stored hash.
    ///
    /// Cost parameters are taken from the hash itself, so hashes produced
    /// under older settings keep verifying. A malformed hash is a mismatch.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };

        self.argon2()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn hash_async(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|_| PasswordError::Aborted)?
    }

    /// [`verify`](Self::verify) on the blocking pool
    pub async fn verify_async(&self, password: String, hash: String) -> Result<bool, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|_| PasswordError::Aborted)
    }
}
