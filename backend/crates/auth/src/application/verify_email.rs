//! Verify Email Use Case
//!
//! Redeems a single-use email-verification token. Users click links
//! twice; a second redemption reports success without touching state so
//! the repeat click is not confusing.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entity::ephemeral_token::TokenKind;
use crate::domain::repository::EphemeralTokenRepository;
use crate::error::{AuthError, AuthResult};

/// Verify email output
#[derive(Debug)]
pub struct VerifyEmailOutput {
    /// True when the token had already been redeemed (benign repeat)
    pub already_verified: bool,
}

/// Verify email use case
pub struct VerifyEmailUseCase<E>
where
    E: EphemeralTokenRepository,
{
    ephemeral_repo: Arc<E>,
}

impl<E> VerifyEmailUseCase<E>
where
    E: EphemeralTokenRepository,
{
    pub fn new(ephemeral_repo: Arc<E>) -> Self {
        Self { ephemeral_repo }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<VerifyEmailOutput> {
        let record = self
            .ephemeral_repo
            .find_by_token(token, TokenKind::EmailVerification)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if record.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenInvalid);
        }

        if record.is_used() {
            return Ok(VerifyEmailOutput {
                already_verified: true,
            });
        }

        self.ephemeral_repo
            .redeem_email_verification(&record.ephemeral_token_id, &record.account_id)
            .await?;

        tracing::info!(account_id = %record.account_id, "Email verified");

        Ok(VerifyEmailOutput {
            already_verified: false,
        })
    }
}
