use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use salesdesk_core::text::require_not_blank;
use salesdesk_core::{DomainResult, ValueObject};

/// Short-lived opaque token with an expiry instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    value: String,
    expires_at: DateTime<Utc>,
}

impl Token {
    pub fn new(value: &str, expires_at: DateTime<Utc>) -> DomainResult<Self> {
        Ok(Self {
            value: require_not_blank(value, "token cannot be empty")?,
            expires_at,
        })
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Expired once `now` is strictly after the expiry instant.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_expired_at(now)
    }

    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }
}

impl ValueObject for Token {}

impl core::fmt::Display for Token {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.value)
    }
}
