//! Refresh Rotation Use Case
//!
//! The core of the session lifecycle: validates a presented refresh
//! token, rotates it within its family, and contains reuse.
//!
//! Family states: **Active** (exactly one live record) and **Exhausted**
//! (every record revoked). Presenting an already-rotated token moves the
//! family to Exhausted - whether the presenter is an attacker replaying
//! a stolen token or a legitimate client retrying out of sync, the only
//! safe answer is to force a fresh login.

use std::sync::Arc;

use chrono::Utc;

use crate::application::token::{TokenPair, TokenSigner};
use crate::domain::entity::refresh_token::RefreshTokenRecord;
use crate::domain::repository::{AccountRepository, RefreshTokenRepository};
use crate::error::{AuthError, AuthResult};
use platform::crypto::sha256_hex;

/// Refresh rotation use case
pub struct RefreshUseCase<A, R>
where
    A: AccountRepository,
    R: RefreshTokenRepository,
{
    account_repo: Arc<A>,
    refresh_repo: Arc<R>,
    signer: Arc<TokenSigner>,
}

impl<A, R> RefreshUseCase<A, R>
where
    A: AccountRepository,
    R: RefreshTokenRepository,
{
    pub fn new(account_repo: Arc<A>, refresh_repo: Arc<R>, signer: Arc<TokenSigner>) -> Self {
        Self {
            account_repo,
            refresh_repo,
            signer,
        }
    }

    /// Rotate a presented refresh token, returning a fresh pair
    pub async fn execute(&self, presented: &str) -> AuthResult<TokenPair> {
        // Signature and expiry first: a forged or expired token never
        // reaches the store.
        self.signer.verify(presented)?;

        let token_hash = sha256_hex(presented.as_bytes());
        let stored = self
            .refresh_repo
            .find_by_hash(&token_hash)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if stored.revoked {
            // Reuse event: this token was already rotated away. Revoke
            // the entire family and force re-authentication.
            return Err(self.contain_reuse(&stored).await?);
        }

        if stored.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenInvalid);
        }

        let account = self
            .account_repo
            .find_by_id(&stored.account_id)
            .await?
            .ok_or_else(|| {
                AuthError::Internal("refresh token references missing account".to_string())
            })?;

        let issued = self
            .signer
            .issue(*account.account_id.as_uuid(), &account.email, account.kind)?;

        // Same family propagates across the chain
        let replacement = RefreshTokenRecord::new(
            stored.account_id,
            sha256_hex(issued.pair.refresh_token.as_bytes()),
            stored.family,
            issued.refresh_expires_at,
        );

        // Single conditional write: of two racing rotations on this
        // record, exactly one lands the revoke-and-replace; the loser is
        // handled as reuse.
        let won = self
            .refresh_repo
            .rotate(&stored.refresh_token_id, &replacement)
            .await?;
        if !won {
            return Err(self.contain_reuse(&stored).await?);
        }

        tracing::info!(
            account_id = %stored.account_id,
            family = %stored.family,
            "Refresh token rotated"
        );

        Ok(issued.pair)
    }

    /// Revoke every record of the compromised family and report the
    /// distinguished revocation error.
    ///
    /// The audit log carries the account and family; a wholly unknown
    /// token never reaches this path, which is what separates an active
    /// attack from a client bug in the security event stream.
    async fn contain_reuse(&self, stored: &RefreshTokenRecord) -> AuthResult<AuthError> {
        let revoked = self.refresh_repo.revoke_family(stored.family).await?;

        tracing::warn!(
            account_id = %stored.account_id,
            family = %stored.family,
            records_revoked = revoked,
            "Refresh token reuse detected; rotation family revoked"
        );

        Ok(AuthError::SessionRevoked)
    }
}
