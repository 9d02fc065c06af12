//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::account_kind::AccountKind;

// ============================================================================
// Register / Login
// ============================================================================

/// Register request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Account kind wire code (`B2C` / `B2B`); defaults to consumer
    #[serde(default)]
    pub kind: AccountKind,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Token pair response (register, login, refresh)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

// ============================================================================
// Refresh / Logout
// ============================================================================

/// Refresh request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Logout request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub refresh_token: String,
}

// ============================================================================
// Email verification / password reset
// ============================================================================

/// Verify email request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequest {
    pub token: String,
}

/// Forgot password request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Reset password request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: String,
    pub password: String,
}

/// Generic outcome message
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub message: String,
}

// ============================================================================
// Guest sessions
// ============================================================================

/// Guest session creation request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSessionRequest {
    pub email: Option<String>,
    pub full_name: Option<String>,
}

/// Guest session response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSessionResponse {
    pub session_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Guest session status (validation)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuestSessionStatusResponse {
    pub session_token: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Authenticated account info
// ============================================================================

/// Current account info response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub account_id: uuid::Uuid,
    pub email: String,
    pub kind: AccountKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_deserialization() {
        let json = r#"{"email":"a@b.com","password":"hunter2hunter2","kind":"B2B","fullName":"ACME"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.email, "a@b.com");
        assert_eq!(request.kind, AccountKind::Business);
        assert_eq!(request.full_name.as_deref(), Some("ACME"));
        assert!(request.phone.is_none());
    }

    #[test]
    fn test_register_kind_defaults_to_consumer() {
        let json = r#"{"email":"a@b.com","password":"hunter2hunter2"}"#;
        let request: RegisterRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.kind, AccountKind::Consumer);
    }

    #[test]
    fn test_token_pair_response_serialization() {
        let response = TokenPairResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 900,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("accessToken"));
        assert!(json.contains("refreshToken"));
        assert!(json.contains(r#""expiresIn":900"#));
    }

    #[test]
    fn test_refresh_request_deserialization() {
        let json = r#"{"refreshToken":"abc"}"#;
        let request: RefreshRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.refresh_token, "abc");
    }
}
