//! Refresh Token Record
//!
//! One link in a rotation chain. The raw signed token is never stored;
//! only its SHA-256 digest is. Records are kept forever (revoked, not
//! deleted) so that a replay of an old token can still be recognized.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::value_object::{account_id::AccountId, token_id::RefreshTokenId};

/// Stored refresh token record
///
/// Every record descended from one original login shares a `family`.
/// Once rotation has begun, at most one record per family is both
/// unrevoked and unexpired; revoking the whole family terminates the
/// session.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub refresh_token_id: RefreshTokenId,
    /// Owning account
    pub account_id: AccountId,
    /// SHA-256 digest (hex) of the signed refresh token
    pub token_hash: String,
    /// Rotation family identifier, minted at login
    pub family: Uuid,
    /// Set on rotation, logout, reuse cascade, or password reset;
    /// never cleared
    pub revoked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl RefreshTokenRecord {
    /// Create a new unrevoked record
    pub fn new(
        account_id: AccountId,
        token_hash: String,
        family: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            refresh_token_id: RefreshTokenId::new(),
            account_id,
            token_hash,
            family,
            revoked: false,
            expires_at,
            created_at: Utc::now(),
        }
    }

    /// Check expiry against an explicit instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Usable for rotation at the given instant
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && !self.is_expired_at(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fresh_record_is_live() {
        let record = RefreshTokenRecord::new(
            AccountId::new(),
            "digest".to_string(),
            Uuid::new_v4(),
            Utc::now() + Duration::days(7),
        );
        assert!(!record.revoked);
        assert!(record.is_live_at(Utc::now()));
    }

    #[test]
    fn test_expiry_boundary() {
        let expires_at = Utc::now();
        let record = RefreshTokenRecord::new(
            AccountId::new(),
            "digest".to_string(),
            Uuid::new_v4(),
            expires_at,
        );
        assert!(record.is_expired_at(expires_at));
        assert!(!record.is_expired_at(expires_at - Duration::seconds(1)));
    }
}
