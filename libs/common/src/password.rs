//! Password hashing helpers
//!
//! The account service hashes at create/update time; the auth service
//! verifies at login. Both sides share these helpers so the parameters stay
//! in one place.

use crate::error::{ServiceError, ServiceResult};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};

/// Hash a plaintext password with the default argon2 cost
pub fn hash(plain: &str) -> ServiceResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let argon2 = Argon2::default();
    let hashed = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| ServiceError::Internal(format!("failed to hash password: {}", e)))?
        .to_string();
    Ok(hashed)
}

/// Verify a plaintext password against a stored hash
///
/// A hash that fails to parse counts as a mismatch rather than an error;
/// callers treat both the same way.
pub fn verify(plain: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_succeeds() {
        let hashed = hash("pw12345").unwrap();
        assert!(verify("pw12345", &hashed));
    }

    #[test]
    fn wrong_password_fails() {
        let hashed = hash("pw12345").unwrap();
        assert!(!verify("different", &hashed));
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash("pw12345").unwrap();
        let b = hash("pw12345").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_is_a_mismatch() {
        assert!(!verify("pw12345", "not-a-phc-string"));
    }
}
