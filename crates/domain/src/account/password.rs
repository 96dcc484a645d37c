//! Password hashing.

use argon2::{
    Argon2,
    password_hash::{self, PasswordHash, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::DomainError;

/// Hashes and verifies user passwords.
pub trait PasswordHasher: Send + Sync {
    /// Produces a self-describing hash string for storage.
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Checks a password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Argon2id with default parameters.
#[derive(Debug, Clone, Default)]
pub struct Argon2PasswordHasher;

impl Argon2PasswordHasher {
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        password_hash::PasswordHasher::hash_password(
            &Argon2::default(),
            password.as_bytes(),
            &salt,
        )
        .map(|hash| hash.to_string())
        .map_err(|_| DomainError::PasswordHash)
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
