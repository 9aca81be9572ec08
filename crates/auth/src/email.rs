use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use salesdesk_core::text::require_not_blank;
use salesdesk_core::{DomainError, DomainResult, ValueObject};

static LOGIN_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Z|a-z]{2,}$").unwrap());

/// Login e-mail address, stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn new(raw: &str) -> DomainResult<Self> {
        require_not_blank(raw, "email cannot be empty")?;
        if !LOGIN_EMAIL.is_match(raw) {
            return Err(DomainError::validation("invalid email format"));
        }
        Ok(Self(raw.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Email {}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Email::new(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_cases_valid_addresses() {
        let email = Email::new("Alice.Smith+promo@Example.COM.br").unwrap();
        assert_eq!(email.as_str(), "alice.smith+promo@example.com.br");
        assert_eq!(email.to_string(), "alice.smith+promo@example.com.br");
    }

    #[test]
    fn rejects_blank_and_malformed() {
        match Email::new("   ").unwrap_err() {
            DomainError::Validation(m) => assert_eq!(m, "email cannot be empty"),
            _ => panic!("Expected Validation error"),
        }
        for bad in ["alice", "alice@", "alice@example", "alice@example.c", "a b@example.com", "@example.com"] {
            match Email::new(bad).unwrap_err() {
                DomainError::Validation(m) => assert_eq!(m, "invalid email format", "{bad}"),
                _ => panic!("Expected Validation error"),
            }
        }
    }

    #[test]
    fn equality_ignores_input_case() {
        assert_eq!(Email::new("BOB@example.com").unwrap(), Email::new("bob@EXAMPLE.com").unwrap());
    }

    #[test]
    fn serde_round_trips_as_plain_string() {
        let email = Email::new("bob@example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"bob@example.com\"");
        assert_eq!(serde_json::from_str::<Email>(&json).unwrap(), email);
        assert!(serde_json::from_str::<Email>("\"nope\"").is_err());
    }
}
