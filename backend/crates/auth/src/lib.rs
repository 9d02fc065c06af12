//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Registration and login with email + password
//! - RS256-signed access/refresh token pairs
//! - Refresh-token rotation with family-wide reuse containment
//! - Single-use email-verification and password-reset tokens
//! - Anonymous guest sessions for checkout without an account
//!
//! ## Security Model
//! - Passwords hashed with bcrypt at a fixed work factor
//! - Refresh tokens stored only as SHA-256 digests
//! - A replayed (already-rotated) refresh token revokes its whole
//!   rotation family, forcing re-authentication
//! - Password reset terminates every active session of the account

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use application::notifier::LogNotifier;
pub use application::token::TokenSigner;
pub use error::{AuthError, AuthResult};
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
