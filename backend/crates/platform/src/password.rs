//! Password Hashing and Verification
//!
//! NIST SP 800-63B compliant password handling with:
//! - bcrypt hashing at a fixed work factor
//! - Zeroization of clear-text material
//!
//! The work factor is pinned so verification latency stays in the
//! low-hundreds-of-milliseconds range while remaining expensive for
//! offline brute force.

use std::fmt;

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

// ============================================================================
// Constants (NIST SP 800-63B compliant)
// ============================================================================

/// Minimum password length (NIST: SHALL be at least 8)
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// bcrypt cost factor. Fixed; changing it only affects newly stored hashes.
pub const BCRYPT_COST: u32 = 12;

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is too short
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Password contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password contains invalid characters (control characters)
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Invalid hash format
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password with automatic memory zeroization
///
/// Ensures the secret is erased from memory when the value is dropped.
/// Does not implement `Clone`; `Debug` output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    /// Create a new clear text password with validation
    ///
    /// Unicode is normalized using NFKC before validation, and length is
    /// counted in code points (not bytes) per NIST SP 800-63B.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        let char_count = normalized.chars().count();

        if char_count < MIN_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        // Control characters other than space/tab/newline are rejected
        for ch in normalized.chars() {
            if ch.is_control() && ch != ' ' && ch != '\t' && ch != '\n' {
                return Err(PasswordPolicyError::InvalidCharacter);
            }
        }

        Ok(Self(normalized))
    }

    /// Get the password bytes for hashing
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    /// Hash this password with bcrypt at [`BCRYPT_COST`]
    ///
    /// A random 128-bit salt is generated per call; the salt is embedded
    /// in the returned hash string.
    pub fn hash(&self) -> Result<HashedPassword, PasswordHashError> {
        let hash = bcrypt::hash(self.as_bytes(), BCRYPT_COST)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;
        Ok(HashedPassword { hash })
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// bcrypt hash in modular crypt format (`$2b$12$...`)
///
/// Safe to persist and to print in debug output: it embeds the cost and
/// the salt, never the password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from a stored hash string (e.g., from the database)
    pub fn from_stored(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();

        // Shape check only; full validation happens on verify
        if !hash.starts_with("$2") {
            return Err(PasswordHashError::InvalidHashFormat);
        }

        Ok(Self { hash })
    }

    /// Get the hash string for storage
    pub fn as_str(&self) -> &str {
        &self.hash
    }

    /// Verify a password against this hash
    ///
    /// A mismatch is `Ok(false)`, never an error: callers translate it
    /// into their own authentication failure.
    pub fn verify(&self, password: &ClearTextPassword) -> Result<bool, PasswordHashError> {
        bcrypt::verify(password.as_bytes(), &self.hash)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_bounds() {
        assert!(matches!(
            ClearTextPassword::new("short".to_string()),
            Err(PasswordPolicyError::TooShort { .. })
        ));
        assert!(matches!(
            ClearTextPassword::new("x".repeat(129)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        assert!(matches!(
            ClearTextPassword::new("        ".to_string()),
            Err(PasswordPolicyError::EmptyOrWhitespace)
        ));
        assert!(matches!(
            ClearTextPassword::new("pass\u{0000}word".to_string()),
            Err(PasswordPolicyError::InvalidCharacter)
        ));
        assert!(ClearTextPassword::new("correct horse battery".to_string()).is_ok());
    }

    #[test]
    fn test_hash_and_verify_roundtrip() {
        let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
        let hashed = password.hash().unwrap();

        assert!(hashed.as_str().starts_with("$2"));
        assert!(hashed.verify(&password).unwrap());

        let wrong = ClearTextPassword::new("incorrect horse battery".to_string()).unwrap();
        assert!(!hashed.verify(&wrong).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let password = ClearTextPassword::new("correct horse battery".to_string()).unwrap();
        let a = password.hash().unwrap();
        let b = password.hash().unwrap();
        assert_ne!(a.as_str(), b.as_str());
    }

    #[test]
    fn test_from_stored_rejects_non_bcrypt() {
        assert!(HashedPassword::from_stored("plaintext").is_err());
        assert!(HashedPassword::from_stored("$argon2id$v=19$...").is_err());
    }

    #[test]
    fn test_nfkc_normalization() {
        // Fullwidth and halfwidth forms normalize to the same secret
        let a = ClearTextPassword::new("ｐａｓｓｗｏｒｄ１".to_string()).unwrap();
        let b = ClearTextPassword::new("password1".to_string()).unwrap();
        let hashed = b.hash().unwrap();
        assert!(hashed.verify(&a).unwrap());
    }
}
