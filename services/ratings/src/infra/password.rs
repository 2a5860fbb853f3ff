use anyhow::Context as _;
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::domain::repository::PasswordPort;
use crate::error::RatingsServiceError;

/// Argon2id with the crate's default parameters. Hashing runs on the blocking pool.
#[derive(Clone, Copy, Default)]
pub struct Argon2Passwords;

impl PasswordPort for Argon2Passwords {
    async fn hash(&self, password: &str) -> Result<String, RatingsServiceError> {
        let password = password.to_owned();
        let hash = task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            Argon2::default()
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| anyhow::anyhow!("failed to hash password: {e}"))
        })
        .await
        .context("password hashing task panicked")??;
        Ok(hash)
    }

    async fn verify(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, RatingsServiceError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let valid = task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&password_hash)
                .map_err(|e| anyhow::anyhow!("invalid password hash format: {e}"))?;
            Ok::<bool, anyhow::Error>(
                Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
            )
        })
        .await
        .context("password verification task panicked")??;
        Ok(valid)
    }
}
