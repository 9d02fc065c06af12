//! Repository Traits
//!
//! The narrow record-store interface consumed by the core. Implementation
//! is in the infrastructure layer.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use uuid::Uuid;

use crate::domain::entity::{
    account::Account,
    ephemeral_token::{EphemeralToken, TokenKind},
    guest_session::GuestSession,
    refresh_token::RefreshTokenRecord,
};
use crate::domain::value_object::{
    account_id::AccountId, email::Email, token_id::EphemeralTokenId, token_id::RefreshTokenId,
};
use crate::error::AuthResult;

/// Account repository trait
#[trait_variant::make(AccountRepository: Send)]
pub trait LocalAccountRepository {
    /// Create a new account
    async fn create(&self, account: &Account) -> AuthResult<()>;

    /// Find account by ID
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Find account by (normalized) email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    /// Check if an email is already registered
    async fn email_exists(&self, email: &Email) -> AuthResult<bool>;

    /// Record a successful login
    async fn record_login(&self, account_id: &AccountId, at: DateTime<Utc>) -> AuthResult<()>;
}

/// Refresh token repository trait
#[trait_variant::make(RefreshTokenRepository: Send)]
pub trait LocalRefreshTokenRepository {
    /// Persist a new record (fresh login: first member of a new family)
    async fn insert(&self, record: &RefreshTokenRecord) -> AuthResult<()>;

    /// Look up a record by the presented token's digest
    async fn find_by_hash(&self, token_hash: &str) -> AuthResult<Option<RefreshTokenRecord>>;

    /// Conditionally revoke a single record (`revoked` false -> true).
    ///
    /// Returns whether this call performed the flip. Used by logout,
    /// where losing the race is not an error.
    async fn revoke(&self, refresh_token_id: &RefreshTokenId) -> AuthResult<bool>;

    /// Atomically revoke the presented record and persist its successor.
    ///
    /// The revoke is conditional on `revoked = FALSE`; when it does not
    /// apply (another caller already rotated this record) the successor
    /// MUST NOT be persisted and `false` is returned. Of two racing
    /// rotations exactly one observes `true`.
    async fn rotate(
        &self,
        old_id: &RefreshTokenId,
        replacement: &RefreshTokenRecord,
    ) -> AuthResult<bool>;

    /// Revoke every unrevoked record of a rotation family (reuse cascade).
    /// Returns the number of records revoked.
    async fn revoke_family(&self, family: Uuid) -> AuthResult<u64>;

    /// Revoke every unrevoked record of an account (password reset).
    async fn revoke_all_for_account(&self, account_id: &AccountId) -> AuthResult<u64>;
}

/// Ephemeral token repository trait
#[trait_variant::make(EphemeralTokenRepository: Send)]
pub trait LocalEphemeralTokenRepository {
    /// Persist a freshly minted token
    async fn insert(&self, token: &EphemeralToken) -> AuthResult<()>;

    /// Look up a token by its string and kind
    async fn find_by_token(&self, token: &str, kind: TokenKind)
    -> AuthResult<Option<EphemeralToken>>;

    /// Redeem an email-verification token: mark it used and set the
    /// account's verified flag, atomically. Idempotent - a concurrent
    /// duplicate redemption converges on the same state.
    async fn redeem_email_verification(
        &self,
        token_id: &EphemeralTokenId,
        account_id: &AccountId,
    ) -> AuthResult<()>;

    /// Redeem a password-reset token: mark it used, store the new
    /// password hash, and revoke every refresh token of the account,
    /// all-or-nothing. Fails with `TokenAlreadyUsed` if another caller
    /// redeemed it first.
    async fn redeem_password_reset(
        &self,
        token_id: &EphemeralTokenId,
        account_id: &AccountId,
        new_hash: &HashedPassword,
    ) -> AuthResult<()>;
}

/// Guest session repository trait
#[trait_variant::make(GuestSessionRepository: Send)]
pub trait LocalGuestSessionRepository {
    /// Persist a new guest session
    async fn insert(&self, session: &GuestSession) -> AuthResult<()>;

    /// Look up a session by its token
    async fn find_by_token(&self, session_token: &str) -> AuthResult<Option<GuestSession>>;

    /// Delete expired guest sessions (startup housekeeping)
    async fn delete_expired(&self) -> AuthResult<u64>;
}
