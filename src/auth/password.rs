use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString},
    Argon2, PasswordHasher as _,
};

/// Password hashing contract consumed by the orchestrators.
///
/// Kept behind a trait so the key-stretching function can be swapped without
/// touching any flow logic.
pub trait PasswordHasher: Send + Sync {
    /// Hash a password into its at-rest representation.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails.
    fn hash(&self, password: &str) -> Result<String>;

    /// Verify a password against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool>;
}

/// Argon2id with the crate defaults and a fresh random salt per hash.
#[derive(Debug, Default, Clone, Copy)]
pub struct Argon2Hasher;

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|err| anyhow!("password hashing failed: {err}"))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool> {
        let parsed =
            PasswordHash::new(hash).map_err(|err| anyhow!("stored password hash is invalid: {err}"))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() -> Result<()> {
        let hasher = Argon2Hasher;
        let hash = hasher.hash("correct horse battery staple")?;

        assert!(hash.starts_with("$argon2"));
        assert!(hasher.verify("correct horse battery staple", &hash)?);
        assert!(!hasher.verify("wrong password", &hash)?);

        Ok(())
    }

    #[test]
    fn test_hashes_are_salted() -> Result<()> {
        let hasher = Argon2Hasher;
        let first = hasher.hash("same password")?;
        let second = hasher.hash("same password")?;

        assert_ne!(first, second);

        Ok(())
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        let hasher = Argon2Hasher;
        assert!(hasher.verify("password", "not-a-phc-string").is_err());
    }
}
