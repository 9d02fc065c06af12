//! Account Entity
//!
//! A registered end user of the retail platform. This subsystem only
//! touches the authentication-relevant fields; the wider customer
//! profile is owned elsewhere.

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{
    account_id::AccountId, account_kind::AccountKind, email::Email,
};

/// Account entity
#[derive(Debug, Clone)]
pub struct Account {
    /// Internal UUID identifier
    pub account_id: AccountId,
    /// Unique, case-normalized email
    pub email: Email,
    /// bcrypt hash. `None` for accounts created without a local
    /// password (they authenticate through an alternate path).
    pub password_hash: Option<HashedPassword>,
    /// Consumer or business account
    pub kind: AccountKind,
    /// Deactivated accounts cannot authenticate
    pub is_active: bool,
    /// Set once an email-verification token is redeemed
    pub is_email_verified: bool,
    /// Display name captured at registration
    pub full_name: Option<String>,
    /// Contact phone captured at registration
    pub phone: Option<String>,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account
    pub fn new(
        email: Email,
        password_hash: Option<HashedPassword>,
        kind: AccountKind,
        full_name: Option<String>,
        phone: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            account_id: AccountId::new(),
            email,
            password_hash,
            kind,
            is_active: true,
            is_email_verified: false,
            full_name,
            phone,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the account can authenticate
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    /// Record successful login
    pub fn record_login(&mut self) {
        let now = Utc::now();
        self.last_login_at = Some(now);
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            Email::new("user@example.com").unwrap(),
            None,
            AccountKind::Consumer,
            None,
            None,
        )
    }

    #[test]
    fn test_new_account_defaults() {
        let account = account();
        assert!(account.is_active);
        assert!(!account.is_email_verified);
        assert!(account.last_login_at.is_none());
        assert!(account.can_login());
    }

    #[test]
    fn test_record_login() {
        let mut account = account();
        account.record_login();
        assert!(account.last_login_at.is_some());
    }
}
