// Password hashing and validation

use crate::auth::error::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    /// Hash a password using Argon2id with a random salt
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AuthError::PasswordHashError)
    }

    /// Verify a password against a stored hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
        let parsed = PasswordHash::new(hash).map_err(|_| AuthError::PasswordHashError)?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    /// Validate password strength requirements
    /// At least 8 characters with one letter and one digit
    pub fn validate_password_strength(password: &str) -> Result<(), AuthError> {
        if password.len() < 8 {
            return Err(AuthError::InvalidPasswordFormat(
                "Password must be at least 8 characters".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_alphabetic()) {
            return Err(AuthError::InvalidPasswordFormat(
                "Password must contain at least one letter".to_string(),
            ));
        }
        if !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(AuthError::InvalidPasswordFormat(
                "Password must contain at least one digit".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = PasswordService::hash_password("sturdy-pass1").unwrap();
        assert!(PasswordService::verify_password("sturdy-pass1", &hash).unwrap());
        assert!(!PasswordService::verify_password("wrong-pass1", &hash).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = PasswordService::hash_password("same-pass1").unwrap();
        let b = PasswordService::hash_password("same-pass1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_strength_rules() {
        assert!(PasswordService::validate_password_strength("short1").is_err());
        assert!(PasswordService::validate_password_strength("lettersonly").is_err());
        assert!(PasswordService::validate_password_strength("12345678").is_err());
        assert!(PasswordService::validate_password_strength("goodpass1").is_ok());
    }
}
