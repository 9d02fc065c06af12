//! Logout Use Case
//!
//! Revokes the single presented refresh token. An intentional logout is
//! not a security incident, so there is no family cascade and an unknown
//! token is ignored rather than reported.

use std::sync::Arc;

use crate::domain::repository::RefreshTokenRepository;
use crate::error::AuthResult;
use platform::crypto::sha256_hex;

/// Logout use case
pub struct LogoutUseCase<R>
where
    R: RefreshTokenRepository,
{
    refresh_repo: Arc<R>,
}

impl<R> LogoutUseCase<R>
where
    R: RefreshTokenRepository,
{
    pub fn new(refresh_repo: Arc<R>) -> Self {
        Self { refresh_repo }
    }

    pub async fn execute(&self, presented: &str) -> AuthResult<()> {
        let token_hash = sha256_hex(presented.as_bytes());

        if let Some(stored) = self.refresh_repo.find_by_hash(&token_hash).await? {
            // Losing the race to a concurrent rotation is fine; either
            // way the presented token is dead.
            let _ = self.refresh_repo.revoke(&stored.refresh_token_id).await?;

            tracing::info!(
                account_id = %stored.account_id,
                family = %stored.family,
                "Signed out"
            );
        }

        Ok(())
    }
}
