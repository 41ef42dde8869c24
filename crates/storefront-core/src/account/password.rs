//! Password hashing.
//!
//! Passwords are stored as Argon2id PHC strings. Verification reads the
//! algorithm parameters from the stored hash, so raising the cost later does
//! not invalidate existing accounts.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::{Error, Result};

/// Argon2id hasher with configurable cost.
#[derive(Clone)]
pub struct SecretHasher {
    argon2: Argon2<'static>,
}

impl std::fmt::Debug for SecretHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretHasher").finish_non_exhaustive()
    }
}

impl Default for SecretHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default()),
        }
    }
}

impl SecretHasher {
    /// Build a hasher with explicit cost parameters (memory in KiB).
    ///
    /// # Errors
    ///
    /// Returns an error if argon2 rejects the parameters.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| Error::Hashing(format!("invalid argon2 parameters: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails.
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self.argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(hash.to_string())
    }

    /// Check a password against a stored hash.
    ///
    /// A wrong password is `Ok(false)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash cannot be parsed.
    pub fn verify(&self, password: &str, password_hash: &str) -> Result<bool> {
        let parsed = PasswordHash::new(password_hash)?;
        match self.argon2.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hasher() -> SecretHasher {
        SecretHasher::with_params(1024, 1, 1).unwrap()
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = hasher();
        let hash = hasher.hash("hogehoge").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("hogehoge", &hash).unwrap());
        assert!(!hasher.verify("hogehoge3", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = hasher();
        let first = hasher.hash("hogehoge").unwrap();
        let second = hasher.hash("hogehoge").unwrap();
        assert_ne!(first, second);
        assert!(!first.contains("hogehoge"));
    }

    #[test]
    fn test_verify_uses_stored_parameters() {
        let cheap = hasher();
        let hash = cheap.hash("hogehoge").unwrap();
        let costly = SecretHasher::with_params(2048, 2, 1).unwrap();
        assert!(costly.verify("hogehoge", &hash).unwrap());
    }

    #[test]
    fn test_malformed_hash_is_an_error() {
        let result = hasher().verify("hogehoge", "not-a-phc-string");
        assert!(matches!(result, Err(Error::Hashing(_))));
    }

    #[test]
    fn test_invalid_params_rejected() {
        assert!(SecretHasher::with_params(0, 0, 0).is_err());
    }
}
