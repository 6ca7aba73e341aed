use crate::error::AppError;
use bcrypt::{hash, verify, DEFAULT_COST};

/// Hashes a human-readable password for storage. Every call uses a fresh salt.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, DEFAULT_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Checks `password` against a stored hash. A malformed hash counts as a mismatch.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    match verify(password, hashed_password) {
        Ok(equal) => equal,
        Err(e) => {
            log::warn!("Can't verify password against stored hash: {}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PASSWORD: &str = "hello_world";

    #[test]
    fn test_hashes_differ_from_password_and_each_other() {
        let first = hash_password(PASSWORD).unwrap();
        assert_ne!(first, PASSWORD);

        let second = hash_password(PASSWORD).unwrap();
        assert_ne!(second, PASSWORD);
        assert_ne!(first, second);
    }

    #[test]
    fn test_password_hashing_and_verification() {
        let hashed = hash_password(PASSWORD).unwrap();

        assert!(verify_password(PASSWORD, &hashed));
        assert!(!verify_password("wrong_password", &hashed));
    }

    #[test]
    fn test_verify_with_invalid_hash() {
        assert!(!verify_password(PASSWORD, "invalidhashformat"));
    }
}
