//! Token Signer
//!
//! Issues and verifies RS256-signed bearer tokens. The private key signs;
//! holders of the public key alone can verify, so downstream services
//! never receive signing capability.
//!
//! A refresh token's signature only proves authenticity. Its authority
//! to be used is governed by the persisted rotation state, never by the
//! signature alone.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::config::{AuthConfig, ConfigError};
use crate::domain::entity::account::Account;
use crate::domain::entity::refresh_token::RefreshTokenRecord;
use crate::domain::repository::RefreshTokenRepository;
use crate::domain::value_object::{account_kind::AccountKind, email::Email};
use crate::error::{AuthError, AuthResult};
use platform::crypto::sha256_hex;

/// Claims embedded in both access and refresh tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: account UUID
    pub sub: Uuid,
    /// Account email at issuance
    pub email: String,
    /// Account kind (wire code `B2C` / `B2B`)
    pub kind: AccountKind,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Expiry (Unix seconds)
    pub exp: i64,
    /// Token id; present on refresh tokens so two pairs issued within
    /// the same second still digest differently
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub jti: Option<Uuid>,
}

/// The pair handed to the client
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    /// Seconds until the access token expires
    pub expires_in: i64,
}

/// Issued pair plus the refresh expiry the store needs
pub(crate) struct IssuedTokens {
    pub pair: TokenPair,
    pub refresh_expires_at: DateTime<Utc>,
}

/// RS256 signer, constructed once at startup and injected
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSigner {
    /// Build a signer from configuration
    ///
    /// Malformed key material is a fatal startup error.
    pub fn new(config: &AuthConfig) -> Result<Self, ConfigError> {
        let encoding_key = EncodingKey::from_rsa_pem(config.private_key_pem().as_bytes())
            .map_err(|e| ConfigError::KeyMaterial(format!("private key: {e}")))?;
        let decoding_key = DecodingKey::from_rsa_pem(config.public_key_pem().as_bytes())
            .map_err(|e| ConfigError::KeyMaterial(format!("public key: {e}")))?;

        let access_ttl = Duration::from_std(config.access_token_ttl)
            .map_err(|e| ConfigError::KeyMaterial(format!("access lifetime: {e}")))?;
        let refresh_ttl = Duration::from_std(config.refresh_token_ttl)
            .map_err(|e| ConfigError::KeyMaterial(format!("refresh lifetime: {e}")))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            access_ttl,
            refresh_ttl,
        })
    }

    /// Issue a signed access/refresh pair for an account
    pub(crate) fn issue(
        &self,
        account_id: Uuid,
        email: &Email,
        kind: AccountKind,
    ) -> AuthResult<IssuedTokens> {
        let now = Utc::now();
        let refresh_expires_at = now + self.refresh_ttl;

        let access = Claims {
            sub: account_id,
            email: email.as_str().to_string(),
            kind,
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
            jti: None,
        };
        let refresh = Claims {
            jti: Some(Uuid::new_v4()),
            exp: refresh_expires_at.timestamp(),
            ..access.clone()
        };

        let header = Header::new(Algorithm::RS256);
        let access_token = encode(&header, &access, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))?;
        let refresh_token = encode(&header, &refresh, &self.encoding_key)
            .map_err(|e| AuthError::Internal(format!("token signing failed: {e}")))?;

        Ok(IssuedTokens {
            pair: TokenPair {
                access_token,
                refresh_token,
                expires_in: self.access_ttl.num_seconds(),
            },
            refresh_expires_at,
        })
    }

    /// Verify a token's signature and expiry, returning its claims
    ///
    /// Expected failures (bad signature, expired, malformed) are all
    /// reported as [`AuthError::TokenInvalid`]; nothing here panics.
    pub fn verify(&self, token: &str) -> AuthResult<Claims> {
        let validation = Validation::new(Algorithm::RS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::TokenInvalid)
    }
}

/// Issue a pair for a fresh login and persist the first record of a new
/// rotation family.
pub(crate) async fn open_session<R>(
    signer: &TokenSigner,
    refresh_repo: &R,
    account: &Account,
) -> AuthResult<TokenPair>
where
    R: RefreshTokenRepository,
{
    let issued = signer.issue(*account.account_id.as_uuid(), &account.email, account.kind)?;

    let record = RefreshTokenRecord::new(
        account.account_id,
        sha256_hex(issued.pair.refresh_token.as_bytes()),
        Uuid::new_v4(),
        issued.refresh_expires_at,
    );
    refresh_repo.insert(&record).await?;

    Ok(issued.pair)
}
