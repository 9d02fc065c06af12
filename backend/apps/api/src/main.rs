//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use auth::{AuthConfig, LogNotifier, PgAuthRepository, TokenSigner};
use axum::{
    Router, http,
    http::{Method, header},
};
use base64::Engine;
use base64::engine::general_purpose;
use sqlx::postgres::PgPoolOptions;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,auth=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Database connection
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set in environment");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    // Signing key material: base64-wrapped PEM pair. Malformed keys or
    // lifetimes abort startup here.
    let private_pem = decode_key_env("JWT_PRIVATE_KEY")?;
    let public_pem = decode_key_env("JWT_PUBLIC_KEY")?;

    let access_expires =
        env::var("JWT_ACCESS_EXPIRES").unwrap_or_else(|_| auth::config::DEFAULT_ACCESS_EXPIRES.into());
    let refresh_expires = env::var("JWT_REFRESH_EXPIRES")
        .unwrap_or_else(|_| auth::config::DEFAULT_REFRESH_EXPIRES.into());

    let auth_config = AuthConfig::new(private_pem, public_pem, &access_expires, &refresh_expires)?;
    let signer = TokenSigner::new(&auth_config)?;

    // Startup cleanup: expired guest sessions and unused ephemeral
    // tokens. Errors here should not prevent server startup.
    let repo = PgAuthRepository::new(pool.clone());
    match repo.cleanup_expired().await {
        Ok((guest_sessions, ephemeral_tokens)) => {
            tracing::info!(
                guest_sessions_deleted = guest_sessions,
                ephemeral_tokens_deleted = ephemeral_tokens,
                "Auth cleanup completed"
            );
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Auth cleanup failed, continuing anyway"
            );
        }
    }

    // CORS configuration
    let frontend_origins = env::var("FRONTEND_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:5173,http://127.0.0.1:5173".to_string());

    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .split(',')
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]))
        .allow_credentials(true);

    // Build router
    let app = Router::new()
        .nest("/api/auth", auth::auth_router(repo, signer, LogNotifier))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Read a base64-encoded PEM from the environment
fn decode_key_env(name: &str) -> anyhow::Result<String> {
    let encoded =
        env::var(name).map_err(|_| anyhow::anyhow!("{name} must be set in environment"))?;
    let decoded = general_purpose::STANDARD
        .decode(encoded.trim())
        .map_err(|e| anyhow::anyhow!("{name} is not valid base64: {e}"))?;
    String::from_utf8(decoded).map_err(|e| anyhow::anyhow!("{name} is not valid UTF-8 PEM: {e}"))
}
