//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Extension;
use std::sync::Arc;

use crate::application::notifier::Notifier;
use crate::application::token::{TokenPair, TokenSigner};
use crate::application::{
    CreateGuestSessionInput, CreateGuestSessionUseCase, ForgotPasswordUseCase, LoginInput,
    LoginUseCase, LogoutUseCase, RefreshUseCase, RegisterInput, RegisterUseCase,
    ResetPasswordInput, ResetPasswordUseCase, ValidateGuestSessionUseCase, VerifyEmailUseCase,
};
use crate::domain::repository::{
    AccountRepository, EphemeralTokenRepository, GuestSessionRepository, RefreshTokenRepository,
};
use crate::error::AuthResult;
use crate::presentation::dto::{
    ForgotPasswordRequest, GuestSessionRequest, GuestSessionResponse, GuestSessionStatusResponse,
    LoginRequest, LogoutRequest, MeResponse, MessageResponse, RefreshRequest, RegisterRequest,
    ResetPasswordRequest, TokenPairResponse, VerifyEmailRequest,
};
use crate::presentation::middleware::CurrentAccount;

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R, N>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub signer: Arc<TokenSigner>,
    pub notifier: Arc<N>,
}

fn token_pair_response(tokens: TokenPair) -> TokenPairResponse {
    TokenPairResponse {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.repo.clone(),
        state.repo.clone(),
        state.repo.clone(),
        state.notifier.clone(),
        state.signer.clone(),
    );

    let input = RegisterInput {
        email: req.email,
        password: req.password,
        kind: req.kind,
        full_name: req.full_name,
        phone: req.phone,
    };

    let output = use_case.execute(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(token_pair_response(output.tokens)),
    ))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<TokenPairResponse>>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(state.repo.clone(), state.repo.clone(), state.signer.clone());

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(token_pair_response(output.tokens)))
}

// ============================================================================
// Refresh / Logout
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<RefreshRequest>,
) -> AuthResult<Json<TokenPairResponse>>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case =
        RefreshUseCase::new(state.repo.clone(), state.repo.clone(), state.signer.clone());

    let tokens = use_case.execute(&req.refresh_token).await?;

    Ok(Json(token_pair_response(tokens)))
}

/// POST /api/auth/logout
pub async fn logout<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<LogoutRequest>,
) -> AuthResult<StatusCode>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = LogoutUseCase::new(state.repo.clone());
    use_case.execute(&req.refresh_token).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Email verification
// ============================================================================

/// POST /api/auth/verify-email
pub async fn verify_email<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<VerifyEmailRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(state.repo.clone());
    let output = use_case.execute(&req.token).await?;

    let message = if output.already_verified {
        "Email already verified"
    } else {
        "Email verified"
    };

    Ok(Json(MessageResponse {
        message: message.to_string(),
    }))
}

// ============================================================================
// Password reset
// ============================================================================

/// POST /api/auth/forgot-password
pub async fn forgot_password<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<ForgotPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case =
        ForgotPasswordUseCase::new(state.repo.clone(), state.repo.clone(), state.notifier.clone());
    use_case.execute(&req.email).await?;

    // Same answer whether or not the email exists
    Ok(Json(MessageResponse {
        message: "If the email exists, a reset link has been sent".to_string(),
    }))
}

/// POST /api/auth/reset-password
pub async fn reset_password<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = ResetPasswordUseCase::new(state.repo.clone());
    use_case
        .execute(ResetPasswordInput {
            token: req.token,
            password: req.password,
        })
        .await?;

    Ok(Json(MessageResponse {
        message: "Password updated".to_string(),
    }))
}

// ============================================================================
// Guest sessions
// ============================================================================

/// POST /api/auth/guest
pub async fn guest_create<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Json(req): Json<GuestSessionRequest>,
) -> AuthResult<impl IntoResponse>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = CreateGuestSessionUseCase::new(state.repo.clone());
    let session = use_case
        .execute(CreateGuestSessionInput {
            email: req.email,
            full_name: req.full_name,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GuestSessionResponse {
            session_token: session.session_token,
            expires_at: session.expires_at,
        }),
    ))
}

/// GET /api/auth/guest/{token}
pub async fn guest_validate<R, N>(
    State(state): State<AuthAppState<R, N>>,
    Path(token): Path<String>,
) -> AuthResult<Json<GuestSessionStatusResponse>>
where
    R: AccountRepository
        + RefreshTokenRepository
        + EphemeralTokenRepository
        + GuestSessionRepository
        + Clone
        + Send
        + Sync
        + 'static,
    N: Notifier + Send + Sync + 'static,
{
    let use_case = ValidateGuestSessionUseCase::new(state.repo.clone());
    let session = use_case.execute(&token).await?;

    Ok(Json(GuestSessionStatusResponse {
        session_token: session.session_token,
        email: session.email,
        full_name: session.full_name,
        expires_at: session.expires_at,
    }))
}

// ============================================================================
// Current account
// ============================================================================

/// GET /api/auth/me (requires bearer auth)
pub async fn me(Extension(account): Extension<CurrentAccount>) -> Json<MeResponse> {
    Json(MeResponse {
        account_id: account.account_id,
        email: account.email,
        kind: account.kind,
    })
}
