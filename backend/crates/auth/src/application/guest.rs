//! Guest Session Use Cases
//!
//! Anonymous checkout sessions: created once, validated until their
//! fixed 24-hour expiry, never rotated or revoked.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::entity::guest_session::GuestSession;
use crate::domain::repository::GuestSessionRepository;
use crate::error::{AuthError, AuthResult};

/// Create guest session input
pub struct CreateGuestSessionInput {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Create guest session use case
pub struct CreateGuestSessionUseCase<G>
where
    G: GuestSessionRepository,
{
    guest_repo: Arc<G>,
}

impl<G> CreateGuestSessionUseCase<G>
where
    G: GuestSessionRepository,
{
    pub fn new(guest_repo: Arc<G>) -> Self {
        Self { guest_repo }
    }

    pub async fn execute(&self, input: CreateGuestSessionInput) -> AuthResult<GuestSession> {
        let session = GuestSession::new(input.email, input.full_name);
        self.guest_repo.insert(&session).await?;

        tracing::info!(expires_at = %session.expires_at, "Guest session created");

        Ok(session)
    }
}

/// Validate guest session use case
pub struct ValidateGuestSessionUseCase<G>
where
    G: GuestSessionRepository,
{
    guest_repo: Arc<G>,
}

impl<G> ValidateGuestSessionUseCase<G>
where
    G: GuestSessionRepository,
{
    pub fn new(guest_repo: Arc<G>) -> Self {
        Self { guest_repo }
    }

    pub async fn execute(&self, session_token: &str) -> AuthResult<GuestSession> {
        // Read-only lookup: a transient store failure is retried once
        // before surfacing. Mutating operations never get this treatment.
        let found = match self.guest_repo.find_by_token(session_token).await {
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Guest session lookup failed; retrying once");
                self.guest_repo.find_by_token(session_token).await?
            }
            other => other?,
        };

        let session = found.ok_or(AuthError::TokenInvalid)?;

        if session.is_expired_at(Utc::now()) {
            return Err(AuthError::TokenInvalid);
        }

        Ok(session)
    }
}
