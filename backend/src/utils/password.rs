//! Password hashing and verification built on bcrypt.
//!
//! The plaintext password never appears in logs, error messages, or
//! responses; hashing failures surface as opaque internal errors.

use crate::errors::{ServiceError, ServiceResult};
use bcrypt::{DEFAULT_COST, hash, verify};

/// Hash a password for storage. The salt is embedded in the output, so
/// hashing the same password twice yields different strings.
pub fn hash_password(password: &str) -> ServiceResult<String> {
    hash(password, DEFAULT_COST)
        .map_err(|_| ServiceError::internal_error("Password hashing failed"))
}

/// Verify a password against a stored hash. Returns false on mismatch and
/// also on a malformed hash; this function never fails.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    verify(password, password_hash).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hashed = hash_password("hunter2").unwrap();

        assert!(verify_password("hunter2", &hashed));
        assert!(!verify_password("hunter3", &hashed));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("hunter2").unwrap();
        let second = hash_password("hunter2").unwrap();

        assert_ne!(first, second);
        assert!(verify_password("hunter2", &first));
        assert!(verify_password("hunter2", &second));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_password("hunter2", "not-a-bcrypt-hash"));
    }
}
