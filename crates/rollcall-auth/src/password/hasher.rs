//! Argon2id credential hashing and verification.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use rollcall_core::error::AppError;

/// Hashes and verifies secrets with Argon2id at a fixed work factor.
#[derive(Debug, Clone, Default)]
pub struct CredentialHasher;

impl CredentialHasher {
    pub fn new() -> Self {
        Self
    }

    fn argon2() -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::DEFAULT)
    }

    /// Hash a secret with a fresh random salt. Returns a PHC string.
    pub fn hash(&self, secret: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::argon2()
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Credential hashing failed: {e}")))?;
        Ok(hash.to_string())
    }

    /// `Ok(false)` on mismatch; `Err` only for a corrupt stored hash.
    pub fn verify(&self, secret: &str, hashed: &str) -> Result<bool, AppError> {
        let parsed = PasswordHash::new(hashed)
            .map_err(|e| AppError::internal(format!("Invalid credential hash format: {e}")))?;

        match Self::argon2().verify_password(secret.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Credential verification failed: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = CredentialHasher::new();
        let hashed = hasher.hash("correct horse").unwrap();

        assert!(hashed.starts_with("$argon2id$"));
        assert!(hasher.verify("correct horse", &hashed).unwrap());
        assert!(!hasher.verify("wrong horse", &hashed).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = CredentialHasher::new();
        let a = hasher.hash("same").unwrap();
        let b = hasher.hash("same").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_corrupt_hash_is_internal_error() {
        let hasher = CredentialHasher::new();
        assert!(hasher.verify("anything", "not-a-phc-string").is_err());
    }
}
