//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::notifier::Notifier;
use crate::application::token::TokenSigner;
use crate::domain::repository::{
    AccountRepository, EphemeralTokenRepository, GuestSessionRepository, RefreshTokenRepository,
};
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AuthMiddlewareState, require_auth};

/// Create the Auth router with the PostgreSQL repository
pub fn auth_router<N>(repo: PgAuthRepository, signer: TokenSigner, notifier: N) -> Router
where
    N: Notifier + Clone + Send + Sync + 'static,
{
    auth_router_generic(repo, signer, notifier)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R, N>(repo: R, signer: TokenSigner, notifier: N) -> Router
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Clone + Send + Sync + 'static,
{
    let signer = Arc::new(signer);

    let state = AuthAppState {
        repo: Arc::new(repo),
        signer: signer.clone(),
        notifier: Arc::new(notifier),
    };

    let middleware_state = AuthMiddlewareState { signer };

    Router::new()
        .route("/register", post(handlers::register::<R, N>))
        .route("/login", post(handlers::login::<R, N>))
        .route("/refresh", post(handlers::refresh::<R, N>))
        .route("/logout", post(handlers::logout::<R, N>))
        .route("/verify-email", post(handlers::verify_email::<R, N>))
        .route("/forgot-password", post(handlers::forgot_password::<R, N>))
        .route("/reset-password", post(handlers::reset_password::<R, N>))
        .route("/guest", post(handlers::guest_create::<R, N>))
        .route("/guest/{token}", get(handlers::guest_validate::<R, N>))
        .route(
            "/me",
            get(handlers::me).route_layer(axum::middleware::from_fn_with_state(
                middleware_state,
                require_auth,
            )),
        )
        .with_state(state)
}
