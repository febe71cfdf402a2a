/// Password Hashing and Verification
///
/// One-way hashing of account secrets behind the `SecretVerifier` trait,
/// plus password strength validation applied at registration.

use bcrypt::{hash, verify, DEFAULT_COST};

use crate::error::{AuthError, ValidationError};

const MIN_PASSWORD_LENGTH: usize = 8;
const MAX_PASSWORD_LENGTH: usize = 128;

/// One-way secret hashing and comparison
pub trait SecretVerifier: Send + Sync {
    /// Hash a plaintext secret for storage
    fn hash(&self, plaintext: &str) -> Result<String, AuthError>;

    /// Compare a plaintext secret against a stored hash
    fn matches(&self, plaintext: &str, hash: &str) -> Result<bool, AuthError>;
}

/// bcrypt-backed verifier
#[derive(Debug, Clone, Copy)]
pub struct BcryptVerifier {
    cost: u32,
}

impl BcryptVerifier {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptVerifier {
    fn default() -> Self {
        Self::new(DEFAULT_COST)
    }
}

impl SecretVerifier for BcryptVerifier {
    fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        hash(plaintext, self.cost).map_err(|e| {
            AuthError::UpstreamUnavailable(format!("Password hashing failed: {}", e))
        })
    }

    fn matches(&self, plaintext: &str, hash: &str) -> Result<bool, AuthError> {
        verify(plaintext, hash).map_err(|e| {
            AuthError::UpstreamUnavailable(format!("Password verification failed: {}", e))
        })
    }
}

/// Validate password strength requirements
///
/// Requirements:
/// - Minimum 8 characters
/// - Maximum 128 characters
/// - At least one digit
/// - At least one lowercase letter
/// - At least one uppercase letter
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::TooShort(
            "password".to_string(),
            MIN_PASSWORD_LENGTH,
        ));
    }

    // bcrypt only looks at the first 72 bytes; the cap also bounds hashing work
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong(
            "password".to_string(),
            MAX_PASSWORD_LENGTH,
        ));
    }

    let has_digit = password.chars().any(|c| c.is_numeric());
    let has_lowercase = password.chars().any(|c| c.is_lowercase());
    let has_uppercase = password.chars().any(|c| c.is_uppercase());

    if !has_digit || !has_lowercase || !has_uppercase {
        return Err(ValidationError::InvalidFormat(
            "password must contain at least one digit, one lowercase letter, and one uppercase letter"
                .to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> BcryptVerifier {
        BcryptVerifier::new(4)
    }

    #[test]
    fn test_hash_password() {
        let password = "ValidPassword123";
        let hash = verifier().hash(password).expect("Failed to hash password");

        assert_ne!(password, hash);
        assert!(hash.starts_with("$2"));
    }

    #[test]
    fn test_verify_password() {
        let password = "ValidPassword123";
        let hash = verifier().hash(password).expect("Failed to hash password");

        assert!(verifier().matches(password, &hash).expect("Failed to verify password"));
    }

    #[test]
    fn test_verify_wrong_password() {
        let hash = verifier().hash("ValidPassword123").expect("Failed to hash password");

        let is_valid = verifier()
            .matches("WrongPassword123", &hash)
            .expect("Failed to verify password");
        assert!(!is_valid);
    }

    #[test]
    fn test_corrupt_hash_is_an_upstream_error() {
        let result = verifier().matches("ValidPassword123", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(AuthError::UpstreamUnavailable(_))));
    }

    #[test]
    fn test_too_short_password() {
        assert!(validate_password_strength("Short1").is_err());
    }

    #[test]
    fn test_too_long_password() {
        let long_password = "a".repeat(MAX_PASSWORD_LENGTH + 1) + "A1";
        assert!(validate_password_strength(&long_password).is_err());
    }

    #[test]
    fn test_missing_character_classes() {
        assert!(validate_password_strength("NoDigitsPassword").is_err());
        assert!(validate_password_strength("NOLOWERCASE1").is_err());
        assert!(validate_password_strength("nouppercase1").is_err());
    }

    #[test]
    fn test_valid_password() {
        assert!(validate_password_strength("ValidPassword123").is_ok());
    }
}
