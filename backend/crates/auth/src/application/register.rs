//! Register Use Case
//!
//! Creates a new account, queues email verification, and opens the
//! first session.

use std::sync::Arc;

use uuid::Uuid;

use crate::application::config::EMAIL_VERIFICATION_TTL;
use crate::application::notifier::{Notifier, dispatch};
use crate::application::token::{TokenPair, TokenSigner, open_session};
use crate::domain::entity::account::Account;
use crate::domain::entity::ephemeral_token::{EphemeralToken, TokenKind};
use crate::domain::repository::{
    AccountRepository, EphemeralTokenRepository, RefreshTokenRepository,
};
use crate::domain::value_object::{account_kind::AccountKind, email::Email};
use crate::error::{AuthError, AuthResult};
use platform::password::ClearTextPassword;

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub kind: AccountKind,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    pub account_id: Uuid,
    pub tokens: TokenPair,
}

/// Register use case
pub struct RegisterUseCase<A, R, E, N>
where
    A: AccountRepository,
    R: RefreshTokenRepository,
    E: EphemeralTokenRepository,
    N: Notifier + Send + Sync + 'static,
{
    account_repo: Arc<A>,
    refresh_repo: Arc<R>,
    ephemeral_repo: Arc<E>,
    notifier: Arc<N>,
    signer: Arc<TokenSigner>,
}

impl<A, R, E, N> RegisterUseCase<A, R, E, N>
where
    A: AccountRepository,
    R: RefreshTokenRepository,
    E: EphemeralTokenRepository,
    N: Notifier + Send + Sync + 'static,
{
    pub fn new(
        account_repo: Arc<A>,
        refresh_repo: Arc<R>,
        ephemeral_repo: Arc<E>,
        notifier: Arc<N>,
        signer: Arc<TokenSigner>,
    ) -> Self {
        Self {
            account_repo,
            refresh_repo,
            ephemeral_repo,
            notifier,
            signer,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        let email = Email::new(&input.email).map_err(|e| AuthError::Validation(e.to_string()))?;

        if self.account_repo.email_exists(&email).await? {
            return Err(AuthError::EmailTaken);
        }

        let password = ClearTextPassword::new(input.password)
            .map_err(|e| AuthError::Validation(e.to_string()))?;
        let password_hash = password
            .hash()
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let account = Account::new(
            email,
            Some(password_hash),
            input.kind,
            input.full_name,
            input.phone,
        );
        self.account_repo.create(&account).await?;

        // Verification token is persisted inline; only the delivery is
        // fire-and-forget.
        let verification = EphemeralToken::new(
            account.account_id,
            TokenKind::EmailVerification,
            chrono::Duration::from_std(EMAIL_VERIFICATION_TTL)
                .map_err(|e| AuthError::Internal(e.to_string()))?,
        );
        self.ephemeral_repo.insert(&verification).await?;

        let notifier = self.notifier.clone();
        let notify_email = account.email.clone();
        let notify_token = verification.token.clone();
        dispatch("email_verification", async move {
            notifier.email_verification(&notify_email, &notify_token).await
        });

        let tokens = open_session(&self.signer, self.refresh_repo.as_ref(), &account).await?;

        tracing::info!(
            account_id = %account.account_id,
            kind = %account.kind,
            "Account registered"
        );

        Ok(RegisterOutput {
            account_id: *account.account_id.as_uuid(),
            tokens,
        })
    }
}
