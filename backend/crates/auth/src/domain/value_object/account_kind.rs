use serde::{Deserialize, Serialize};
use std::fmt;

/// Account kind: retail consumer or business customer.
///
/// Stored in the database and embedded in token claims as the wire code
/// (`B2C` / `B2B`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AccountKind {
    #[default]
    #[serde(rename = "B2C")]
    Consumer,
    #[serde(rename = "B2B")]
    Business,
}

impl AccountKind {
    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            AccountKind::Consumer => "B2C",
            AccountKind::Business => "B2B",
        }
    }

    #[inline]
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "B2C" => Some(AccountKind::Consumer),
            "B2B" => Some(AccountKind::Business),
            _ => None,
        }
    }

    #[inline]
    pub const fn is_business(&self) -> bool {
        matches!(self, AccountKind::Business)
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_roundtrip() {
        assert_eq!(AccountKind::from_code("B2C"), Some(AccountKind::Consumer));
        assert_eq!(AccountKind::from_code("B2B"), Some(AccountKind::Business));
        assert_eq!(AccountKind::from_code("b2c"), None);
        assert_eq!(AccountKind::from_code(""), None);
    }

    #[test]
    fn test_serde_uses_wire_codes() {
        let json = serde_json::to_string(&AccountKind::Business).unwrap();
        assert_eq!(json, r#""B2B""#);
        let kind: AccountKind = serde_json::from_str(r#""B2C""#).unwrap();
        assert_eq!(kind, AccountKind::Consumer);
    }

    #[test]
    fn test_display() {
        assert_eq!(AccountKind::Consumer.to_string(), "B2C");
        assert_eq!(AccountKind::Business.to_string(), "B2B");
    }
}
