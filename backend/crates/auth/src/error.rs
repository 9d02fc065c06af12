//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Generic credential failure. Unknown email, wrong password,
    /// passwordless account, and deactivated account all collapse here
    /// so the response shape cannot be used to enumerate accounts.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Email already registered
    #[error("This email is already registered")]
    EmailTaken,

    /// Token failed signature/expiry checks or is unknown to the store
    #[error("Invalid or expired token")]
    TokenInvalid,

    /// An already-rotated refresh token was presented; its whole family
    /// has been revoked
    #[error("Session revoked due to token reuse; please sign in again")]
    SessionRevoked,

    /// Single-use token redeemed a second time
    #[error("This link has already been used")]
    TokenAlreadyUsed,

    /// Account not found
    #[error("Account not found")]
    AccountNotFound,

    /// Input validation error (email format, password policy)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Record store error
    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::SessionRevoked => StatusCode::UNAUTHORIZED,
            AuthError::EmailTaken => StatusCode::CONFLICT,
            AuthError::TokenAlreadyUsed | AuthError::Validation(_) => StatusCode::BAD_REQUEST,
            AuthError::AccountNotFound => StatusCode::NOT_FOUND,
            AuthError::Storage(e) if is_transient_sqlx(e) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Storage(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::TokenInvalid
            | AuthError::SessionRevoked => ErrorKind::Unauthorized,
            AuthError::EmailTaken => ErrorKind::Conflict,
            AuthError::TokenAlreadyUsed | AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::AccountNotFound => ErrorKind::NotFound,
            AuthError::Storage(e) if is_transient_sqlx(e) => ErrorKind::ServiceUnavailable,
            AuthError::Storage(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether the failure is a transient store condition. The caller
    /// layer may retry a read-only operation once; mutating operations
    /// are never retried (a retried rotation could double-issue tokens).
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthError::Storage(e) if is_transient_sqlx(e))
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        AppError::new(self.kind(), self.to_string())
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Storage(e) => {
                tracing::error!(error = %e, "Auth storage error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::SessionRevoked => {
                // Detailed security event (account, family) is emitted at
                // the detection site in the rotation engine.
                tracing::warn!("Rejected reused refresh token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

fn is_transient_sqlx(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_))
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenInvalid.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::SessionRevoked.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AuthError::EmailTaken.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AuthError::TokenAlreadyUsed.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::AccountNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AuthError::Storage(sqlx::Error::PoolTimedOut).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn test_reuse_is_distinct_from_plain_invalidity() {
        // Same status class, different variants: the audit trail depends
        // on keeping these apart internally.
        let reuse = AuthError::SessionRevoked;
        let invalid = AuthError::TokenInvalid;
        assert_eq!(reuse.status_code(), invalid.status_code());
        assert_ne!(reuse.to_string(), invalid.to_string());
    }

    #[test]
    fn test_transient_detection() {
        assert!(AuthError::Storage(sqlx::Error::PoolTimedOut).is_transient());
        assert!(!AuthError::TokenInvalid.is_transient());
        assert!(!AuthError::Storage(sqlx::Error::RowNotFound).is_transient());
    }
}
