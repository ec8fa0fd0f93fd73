//! Argon2id password hashing, verification, and strength validation.
//!
//! Hashes are stored in PHC string format so parameters and salt travel
//! with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Minimum password length for staff accounts.
pub const MIN_PASSWORD_LENGTH: usize = 12;

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// `Ok(false)` on mismatch; `Err` only for a malformed stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), String> {
    if password.chars().count() < min_length {
        return Err(format!(
            "Password must be at least {min_length} characters long"
        ));
    }
    if password.trim().is_empty() {
        return Err("Password must not be blank".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("front-porch-lantern").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("front-porch-lantern", &hash).unwrap());
        assert!(!verify_password("back-porch-lantern", &hash).unwrap());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("anything", "not-a-phc-string").is_err());
    }

    #[test]
    fn strength_rules() {
        assert!(validate_password_strength("short", MIN_PASSWORD_LENGTH)
            .unwrap_err()
            .contains("at least 12"));
        assert!(validate_password_strength("            ", MIN_PASSWORD_LENGTH).is_err());
        assert!(validate_password_strength("twelve_chars", MIN_PASSWORD_LENGTH).is_ok());
    }
}
