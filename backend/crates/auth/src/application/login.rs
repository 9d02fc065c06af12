//! Login Use Case
//!
//! Authenticates an account and opens a new session (new rotation
//! family). All expected failure modes collapse into one generic
//! invalid-credentials error so the response shape cannot be used to
//! probe which emails are registered.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::application::token::{TokenPair, TokenSigner, open_session};
use crate::domain::repository::{AccountRepository, RefreshTokenRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};
use platform::password::ClearTextPassword;

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
pub struct LoginOutput {
    pub account_id: Uuid,
    pub tokens: TokenPair,
}

/// Login use case
pub struct LoginUseCase<A, R>
where
    A: AccountRepository,
    R: RefreshTokenRepository,
{
    account_repo: Arc<A>,
    refresh_repo: Arc<R>,
    signer: Arc<TokenSigner>,
}

impl<A, R> LoginUseCase<A, R>
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

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let email = Email::new(&input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let account = self
            .account_repo
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !account.can_login() {
            return Err(AuthError::InvalidCredentials);
        }

        // Accounts without a local password use an alternate login path
        let password_hash = account
            .password_hash
            .as_ref()
            .ok_or(AuthError::InvalidCredentials)?;

        let password =
            ClearTextPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        let password_valid = password_hash
            .verify(&password)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        if !password_valid {
            return Err(AuthError::InvalidCredentials);
        }

        self.account_repo
            .record_login(&account.account_id, Utc::now())
            .await?;

        let tokens = open_session(&self.signer, self.refresh_repo.as_ref(), &account).await?;

        tracing::info!(account_id = %account.account_id, "Account signed in");

        Ok(LoginOutput {
            account_id: *account.account_id.as_uuid(),
            tokens,
        })
    }
}
