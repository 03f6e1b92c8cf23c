//! Password hashing
//!
//! bcrypt with a per-hash random salt; only the hash is ever stored.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashFailed(String),
}

pub fn hash_password(password: &str, cost: u32) -> Result<String, PasswordError> {
    bcrypt::hash(password, cost).map_err(|e| PasswordError::HashFailed(e.to_string()))
}

/// A malformed stored hash counts as a mismatch.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("Cashier123", 4).unwrap();
        assert_ne!(hash, "Cashier123");
        assert!(verify_password("Cashier123", &hash));
        assert!(!verify_password("cashier123", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("Admin123", 4).unwrap();
        let b = hash_password("Admin123", 4).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_malformed_hash_is_rejected() {
        assert!(!verify_password("Admin123", "not-a-bcrypt-hash"));
    }
}
