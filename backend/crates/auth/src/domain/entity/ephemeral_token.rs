//! Ephemeral Token Entity
//!
//! Single-use, time-limited tokens for email verification and password
//! reset. Independent of the refresh-token rotation machinery.

use chrono::{DateTime, Duration, Utc};
use derive_more::Display;
use platform::crypto::random_token_hex;

use crate::domain::value_object::{account_id::AccountId, token_id::EphemeralTokenId};

/// Token entropy in bytes (256 bits, rendered as 64 hex characters)
const TOKEN_BYTES: usize = 32;

/// What an ephemeral token is good for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenKind {
    #[display("EMAIL_VERIFICATION")]
    EmailVerification,
    #[display("PASSWORD_RESET")]
    PasswordReset,
}

impl TokenKind {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            TokenKind::EmailVerification => "EMAIL_VERIFICATION",
            TokenKind::PasswordReset => "PASSWORD_RESET",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "EMAIL_VERIFICATION" => Some(TokenKind::EmailVerification),
            "PASSWORD_RESET" => Some(TokenKind::PasswordReset),
            _ => None,
        }
    }
}

/// Ephemeral token entity
#[derive(Debug, Clone)]
pub struct EphemeralToken {
    pub ephemeral_token_id: EphemeralTokenId,
    /// Owning account
    pub account_id: AccountId,
    pub kind: TokenKind,
    /// Random unguessable token string (the lookup key; sent to the user)
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Set exactly once at redemption; never cleared. A used token is
    /// permanently inert.
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl EphemeralToken {
    /// Mint a new token with a fresh random string
    pub fn new(account_id: AccountId, kind: TokenKind, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            ephemeral_token_id: EphemeralTokenId::new(),
            account_id,
            kind,
            token: random_token_hex(TOKEN_BYTES),
            expires_at: now + ttl,
            used_at: None,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_used(&self) -> bool {
        self.used_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_shape() {
        let token = EphemeralToken::new(
            AccountId::new(),
            TokenKind::EmailVerification,
            Duration::hours(24),
        );
        assert_eq!(token.token.len(), 64);
        assert!(token.token.chars().all(|c| c.is_ascii_hexdigit()));
        assert!(!token.is_used());
        assert!(!token.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_tokens_are_unique() {
        let a = EphemeralToken::new(AccountId::new(), TokenKind::PasswordReset, Duration::hours(1));
        let b = EphemeralToken::new(AccountId::new(), TokenKind::PasswordReset, Duration::hours(1));
        assert_ne!(a.token, b.token);
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(TokenKind::EmailVerification.code(), "EMAIL_VERIFICATION");
        assert_eq!(
            TokenKind::from_code("PASSWORD_RESET"),
            Some(TokenKind::PasswordReset)
        );
        assert_eq!(TokenKind::from_code("unknown"), None);
    }
}
