//! Outbound Notifier
//!
//! Interface boundary for email delivery. The real mailer is an external
//! collaborator; the core only hands it a message and never lets its
//! failure fail the primary operation.

use std::future::Future;

use thiserror::Error;

use crate::domain::value_object::email::Email;

/// Notification dispatch failure (logged, never propagated)
#[derive(Debug, Error)]
#[error("notification dispatch failed: {0}")]
pub struct NotifyError(pub String);

/// Outbound notification interface
#[trait_variant::make(Notifier: Send)]
pub trait LocalNotifier {
    /// Send an email-verification link
    async fn email_verification(&self, email: &Email, token: &str) -> Result<(), NotifyError>;

    /// Send a password-reset link
    async fn password_reset(&self, email: &Email, token: &str) -> Result<(), NotifyError>;
}

/// Log-only notifier: writes the would-be delivery to tracing.
///
/// Stands in for the mailer in development and tests; production wires
/// a queue-backed implementation at the same seam.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    async fn email_verification(&self, email: &Email, token: &str) -> Result<(), NotifyError> {
        tracing::info!(email = %email, token, "email verification requested");
        Ok(())
    }

    async fn password_reset(&self, email: &Email, token: &str) -> Result<(), NotifyError> {
        tracing::info!(email = %email, token, "password reset requested");
        Ok(())
    }
}

/// Fire-and-forget dispatch: run the notification on its own task so the
/// caller's latency and outcome are decoupled from notifier availability.
pub(crate) fn dispatch<F>(context: &'static str, fut: F)
where
    F: Future<Output = Result<(), NotifyError>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(e) = fut.await {
            tracing::warn!(error = %e, context, "notification dispatch failed");
        }
    });
}
