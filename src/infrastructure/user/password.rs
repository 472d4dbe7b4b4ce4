//! Argon2 password hashing

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Argon2,
};
use std::fmt::Debug;

use crate::domain::DomainError;

pub trait PasswordHasher: Send + Sync + Debug {
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// False for a wrong password and for an unparseable hash alike
    fn verify(&self, password: &str, hash: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        PasswordHash::new(hash)
            .map(|parsed| {
                self.argon2
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok()
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("budget2024").unwrap();

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("budget2024", &hash));
        assert!(!hasher.verify("budget2025", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = Argon2Hasher::new();
        let first = hasher.hash("secret1").unwrap();
        let second = hasher.hash("secret1").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("secret1", &second));
    }

    #[test]
    fn test_verify_garbage_hash() {
        let hasher = Argon2Hasher::new();
        assert!(!hasher.verify("secret1", "not-a-phc-string"));
        assert!(!hasher.verify("secret1", ""));
    }
}
