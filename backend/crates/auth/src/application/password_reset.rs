//! Password Reset Use Cases
//!
//! Two halves: requesting a reset link and redeeming it. The request
//! half answers identically whether or not the email is registered.
//! The redemption half is fail-hard on repeats - a stale reset link
//! must never silently succeed - and terminates every active session
//! of the account.

use std::sync::Arc;

use chrono::Utc;

use crate::application::config::PASSWORD_RESET_TTL;
use crate::application::notifier::{Notifier, dispatch};
use crate::domain::entity::ephemeral_token::{EphemeralToken, TokenKind};
use crate::domain::repository::{AccountRepository, EphemeralTokenRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use platform::password::ClearTextPassword;

/// Forgot-password use case (issues the reset token)
pub struct ForgotPasswordUseCase<A, E, N>
where
    A: AccountRepository,
    E: EphemeralTokenRepository,
    N: Notifier + Send + Sync + 'static,
{
    account_repo: Arc<A>,
    ephemeral_repo: Arc<E>,
    notifier: Arc<N>,
}

impl<A, E, N> ForgotPasswordUseCase<A, E, N>
where
    A: AccountRepository,
    E: EphemeralTokenRepository,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(account_repo: Arc<A>, ephemeral_repo: Arc<E>, notifier: Arc<N>) -> Self {
        Self {
            account_repo,
            ephemeral_repo,
            notifier,
        }
    }

    /// Issue a reset token if the account exists.
    ///
    /// Returns `Ok(())` in every expected case - including unknown or
    /// malformed emails - so the caller always answers with the same
    /// neutral message.
    pub async fn execute(&self, email: &str) -> AuthResult<()> {
        let Ok(email) = Email::new(email) else {
            return Ok(());
        };

        let Some(account) = self.account_repo.find_by_email(&email).await? else {
            return Ok(());
        };

        let reset = EphemeralToken::new(
            account.account_id,
            TokenKind::PasswordReset,
            chrono::Duration::from_std(PASSWORD_RESET_TTL)
                .map_err(|e| AuthError::Internal(e.to_string()))?,
        );
        self.ephemeral_repo.insert(&reset).await?;

        let notifier = self.notifier.clone();
        let notify_email = account.email.clone();
        let notify_token = reset.token.clone();
        dispatch("password_reset", async move {
            notifier.password_reset(&notify_email, &notify_token).await
        });

        tracing::info!(account_id = %account.account_id, "Password reset requested");

        Ok(())
    }
}

/// Reset-password input
pub struct ResetPasswordInput {
    pub token: String,
    pub password: String,
}

/// Reset-password use case (redeems the token)
pub struct ResetPasswordUseCase<E>
where
    E: EphemeralTokenRepository,
{
    ephemeral_repo: Arc<E>,
}

impl<E> ResetPasswordUseCase<E>
where
    E: EphemeralTokenRepository,
{
    pub fn new(ephemeral_repo: Arc<E>) -> Self {
        Self { ephemeral_repo }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<()> {
        let record = self
            .ephemeral_repo
            .find_by_token(&input.token, TokenKind::PasswordReset)
            .await?
            .ok_or(AuthError::TokenInvalid)?;

        if record.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenInvalid);
        }

        if record.is_used() {
            return Err(AuthError::TokenAlreadyUsed);
        }

        let password = ClearTextPassword::new(input.password)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        let new_hash = password
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        // All-or-nothing: mark the token used, store the hash, and
        // revoke every refresh token of the account.
        self.ephemeral_repo
            .redeem_password_reset(&record.ephemeral_token_id, &record.account_id, &new_hash)
            .await?;

        tracing::info!(
            account_id = %record.account_id,
            "Password reset; all sessions revoked"
        );

        Ok(())
    }
}
