//! Opaque password hashing with an Argon2id implementation.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use admin_core::error::AppError;
use admin_core::result::AppResult;

/// Hashes and verifies credentials. Callers never depend on the algorithm.
pub trait PasswordHasher: Send + Sync + std::fmt::Debug + 'static {
    /// Hashes a plaintext password with a fresh salt.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    ///
    /// Returns `Ok(false)` on mismatch and an error only for unreadable hashes.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    /// Creates a new hasher instance.
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2PasswordHasher::new();
        let hash = hasher.hash_password("s3cret!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("s3cret!", &hash).unwrap());
        assert!(!hasher.verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = Argon2PasswordHasher::new();
        let a = hasher.hash_password("same").unwrap();
        let b = hasher.hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_garbage_hash_is_error() {
        let hasher = Argon2PasswordHasher::new();
        assert!(hasher.verify_password("x", "not-a-hash").is_err());
    }
}
