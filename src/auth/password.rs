//! Password hashing and verification using Argon2id

use argon2::{
    password_hash::{
        rand_core::OsRng, Error as PasswordHashError, PasswordHash, PasswordHasher as _,
        PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};
use thiserror::Error;

/// Password hashing failure, distinct from a simple mismatch
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("failed to hash password: {0}")]
    Hash(String),

    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
}

/// Password hasher with fixed Argon2id parameters
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create hasher with default parameters (OWASP recommended)
    pub fn new() -> Self {
        // m=64MiB, t=3 iterations, p=4 lanes
        let params = Params::new(65536, 3, 4, None).expect("Invalid Argon2 params");

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        Self { argon2 }
    }

    /// Hash a password with a freshly generated random salt.
    /// The salt and parameters are embedded in the PHC output string,
    /// so the same password hashes to a different string each time.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {:?}", e);
                PasswordError::Hash(e.to_string())
            })?
            .to_string();

        Ok(password_hash)
    }

    /// Verify a password against a stored PHC hash string.
    ///
    /// Returns `Ok(false)` on a mismatch; an `Err` means the stored hash
    /// itself could not be parsed. The comparison runs in constant time
    /// inside the argon2 crate.
    pub fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash = PasswordHash::new(hash).map_err(|e| {
            tracing::debug!("Failed to parse password hash: {:?}", e);
            PasswordError::MalformedHash(e.to_string())
        })?;

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => {
                tracing::debug!("Password verification failed to run: {:?}", e);
                Err(PasswordError::MalformedHash(e.to_string()))
            }
        }
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
