//! Argon2id password hashing.
//!
//! Hashing and verification are CPU bound, so both run on the blocking pool.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
    password_hash::{SaltString, rand_core::OsRng},
};
use std::sync::Arc;
use tokio::{sync::OnceCell, task};

use crate::error::ServiceError;

// Verified against when the username is unknown, so both paths cost one hash.
const DECOY_PASSWORD: &str = "recipebox-decoy-password";

#[derive(Clone, Debug)]
pub struct PasswordHashing {
    params: Params,
    decoy_hash: Arc<OnceCell<String>>,
}

impl Default for PasswordHashing {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl PasswordHashing {
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self {
            params,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Minimal cost parameters so tests do not spend seconds per hash.
    #[cfg(test)]
    pub(crate) fn fast() -> Self {
        Self::new(Params::new(8, 1, 1, None).unwrap_or_default())
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hash `password` into a PHC string with a fresh random salt.
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if hashing fails.
    pub async fn hash(&self, password: String) -> Result<String, ServiceError> {
        let argon2 = self.argon2();
        task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| ServiceError::Internal(format!("failed to hash password: {err}")))
        })
        .await
        .map_err(|err| ServiceError::Internal(format!("password hashing task failed: {err}")))?
    }

    /// Check `password` against a stored PHC string.
    ///
    /// A missing `stored_hash` is verified against a decoy so the caller
    /// cannot be timed into revealing whether the account exists.
    ///
    /// # Errors
    /// Returns `ServiceError::Internal` if the decoy cannot be prepared or the task fails.
    pub async fn verify(
        &self,
        password: String,
        stored_hash: Option<String>,
    ) -> Result<bool, ServiceError> {
        let (stored_hash, known) = match stored_hash {
            Some(hash) => (hash, true),
            None => (self.decoy().await?, false),
        };
        let argon2 = self.argon2();
        let matched = task::spawn_blocking(move || {
            PasswordHash::new(&stored_hash).is_ok_and(|parsed| {
                argon2
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
        })
        .await
        .map_err(|err| {
            ServiceError::Internal(format!("password verification task failed: {err}"))
        })?;
        Ok(known && matched)
    }

    async fn decoy(&self) -> Result<String, ServiceError> {
        self.decoy_hash
            .get_or_try_init(|| self.hash(DECOY_PASSWORD.to_string()))
            .await
            .cloned()
    }
}
