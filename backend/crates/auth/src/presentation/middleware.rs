//! Auth Middleware
//!
//! Bearer-token authentication for protected routes. Verification is
//! purely cryptographic (public key + expiry); no store round trip.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use uuid::Uuid;

use crate::application::token::TokenSigner;
use crate::domain::value_object::account_kind::AccountKind;
use crate::error::AuthError;

/// Middleware state
#[derive(Clone)]
pub struct AuthMiddlewareState {
    pub signer: Arc<TokenSigner>,
}

/// Verified caller identity, inserted into request extensions
#[derive(Debug, Clone)]
pub struct CurrentAccount {
    pub account_id: Uuid,
    pub email: String,
    pub kind: AccountKind,
}

/// Middleware that requires a valid access token
pub async fn require_auth(
    State(state): State<AuthMiddlewareState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let Some(token) = bearer_token(req.headers()) else {
        return Err(AuthError::TokenInvalid.into_response());
    };

    let claims = match state.signer.verify(token) {
        Ok(claims) => claims,
        Err(e) => return Err(e.into_response()),
    };

    req.extensions_mut().insert(CurrentAccount {
        account_id: claims.sub,
        email: claims.email,
        kind: claims.kind,
    });

    Ok(next.run(req).await)
}

/// Extract the token from an `Authorization: Bearer ...` header
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer abc.def.ghi"),
        );
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn test_bearer_token_missing_or_malformed() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert_eq!(bearer_token(&headers), None);
    }
}
