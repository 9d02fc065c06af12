//! Guest Session Entity
//!
//! An anonymous, time-limited handle allowing checkout without an
//! account. No rotation, no revocation; it simply expires.

use chrono::{DateTime, Duration, Utc};
use platform::crypto::random_token_hex;

/// Fixed guest session lifetime (24 hours, immutable after creation)
pub const GUEST_SESSION_TTL_HOURS: i64 = 24;

/// Token entropy in bytes, same requirement as ephemeral tokens
const TOKEN_BYTES: usize = 32;

/// Guest session entity
#[derive(Debug, Clone)]
pub struct GuestSession {
    /// Random session token (the lookup key)
    pub session_token: String,
    /// Optional contact email for checkout
    pub email: Option<String>,
    /// Optional contact name for checkout
    pub full_name: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl GuestSession {
    /// Create a new guest session expiring in [`GUEST_SESSION_TTL_HOURS`]
    pub fn new(email: Option<String>, full_name: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            session_token: random_token_hex(TOKEN_BYTES),
            email,
            full_name,
            expires_at: now + Duration::hours(GUEST_SESSION_TTL_HOURS),
            created_at: now,
        }
    }

    /// Check expiry against an explicit instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifetime_is_24_hours() {
        let session = GuestSession::new(None, None);
        let lifetime = session.expires_at - session.created_at;
        assert_eq!(lifetime, Duration::hours(24));
    }

    #[test]
    fn test_expiry_with_injected_clock() {
        let session = GuestSession::new(Some("guest@example.com".to_string()), None);
        assert!(!session.is_expired_at(session.created_at));
        assert!(!session.is_expired_at(session.expires_at - Duration::seconds(1)));
        assert!(session.is_expired_at(session.expires_at));
        assert!(session.is_expired_at(session.expires_at + Duration::hours(1)));
    }

    #[test]
    fn test_token_shape() {
        let session = GuestSession::new(None, None);
        assert_eq!(session.session_token.len(), 64);
    }
}
