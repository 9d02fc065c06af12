//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup
//! from the environment and injected; there is no module-level state.

use std::fmt;
use std::time::Duration;

use platform::duration::{DurationParseError, parse_duration};
use thiserror::Error;

/// Default access token lifetime
pub const DEFAULT_ACCESS_EXPIRES: &str = "15m";

/// Default refresh token lifetime
pub const DEFAULT_REFRESH_EXPIRES: &str = "7d";

/// Email verification tokens live for 24 hours
pub const EMAIL_VERIFICATION_TTL: Duration = Duration::from_secs(24 * 3600);

/// Password reset tokens live for 1 hour
pub const PASSWORD_RESET_TTL: Duration = Duration::from_secs(3600);

/// Configuration errors are fatal at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Token lifetime string did not parse
    #[error(transparent)]
    Lifetime(#[from] DurationParseError),

    /// Key material did not parse
    #[error("Invalid signing key material: {0}")]
    KeyMaterial(String),
}

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// RSA private key, PEM (signing)
    jwt_private_key_pem: String,
    /// RSA public key, PEM (verification; safe to distribute)
    jwt_public_key_pem: String,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime
    pub refresh_token_ttl: Duration,
}

impl AuthConfig {
    /// Build a config, parsing the lifetime strings
    ///
    /// Lifetimes use the `<number><s|m|h|d>` grammar; anything else is
    /// rejected here so a misconfigured deployment fails at boot.
    pub fn new(
        jwt_private_key_pem: String,
        jwt_public_key_pem: String,
        access_expires: &str,
        refresh_expires: &str,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            jwt_private_key_pem,
            jwt_public_key_pem,
            access_token_ttl: parse_duration(access_expires)?,
            refresh_token_ttl: parse_duration(refresh_expires)?,
        })
    }

    /// Private key PEM (only the signer should need this)
    pub fn private_key_pem(&self) -> &str {
        &self.jwt_private_key_pem
    }

    /// Public key PEM
    pub fn public_key_pem(&self) -> &str {
        &self.jwt_public_key_pem
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_private_key_pem", &"[REDACTED]")
            .field("jwt_public_key_pem", &"[PEM]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_parse() {
        let config = AuthConfig::new(
            String::new(),
            String::new(),
            DEFAULT_ACCESS_EXPIRES,
            DEFAULT_REFRESH_EXPIRES,
        )
        .unwrap();
        assert_eq!(config.access_token_ttl, Duration::from_secs(15 * 60));
        assert_eq!(config.refresh_token_ttl, Duration::from_secs(7 * 86_400));
    }

    #[test]
    fn test_bad_lifetime_is_fatal() {
        let result = AuthConfig::new(String::new(), String::new(), "15min", "7d");
        assert!(matches!(result, Err(ConfigError::Lifetime(_))));
    }

    #[test]
    fn test_debug_redacts_private_key() {
        let config =
            AuthConfig::new("SECRET".to_string(), String::new(), "15m", "7d").unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("SECRET"));
    }
}
