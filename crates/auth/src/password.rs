//! Password value object and the one-way hashing port.

use serde::{Deserialize, Serialize};

use salesdesk_core::text::require_not_blank;
use salesdesk_core::{DomainError, DomainResult, ValueObject};

use crate::error::CredentialError;

const MIN_LENGTH: usize = 8;
const BCRYPT_MIN_COST: u32 = 4;
const BCRYPT_MAX_COST: u32 = 31;
const SPECIAL_CHARACTERS: &str = r#"!@#$%^&*()_+-=[]{};':"\|,.<>/?"#;

/// One-way hashing primitive.
///
/// `verify` answers `false` for any digest it cannot interpret.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, CredentialError>;

    fn verify(&self, plain: &str, digest: &str) -> bool;
}

/// bcrypt adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    pub fn new(cost: u32) -> Result<Self, CredentialError> {
        if !(BCRYPT_MIN_COST..=BCRYPT_MAX_COST).contains(&cost) {
            return Err(CredentialError::Hashing(format!(
                "bcrypt cost must be between {BCRYPT_MIN_COST} and {BCRYPT_MAX_COST}, got {cost}"
            )));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self {
            cost: Self::DEFAULT_COST,
        }
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, plain: &str) -> Result<String, CredentialError> {
        bcrypt::hash(plain, self.cost).map_err(|e| CredentialError::Hashing(e.to_string()))
    }

    fn verify(&self, plain: &str, digest: &str) -> bool {
        bcrypt::verify(plain, digest).unwrap_or(false)
    }
}

/// Hashed password. Never holds or prints the plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Password {
    digest: String,
}

impl Password {
    /// Checks the composition policy, then hashes.
    pub fn from_plain_text(plain: &str, hasher: &dyn PasswordHasher) -> Result<Self, CredentialError> {
        validate_policy(plain)?;
        Ok(Self {
            digest: hasher.hash(plain)?,
        })
    }

    /// Wraps a digest produced earlier by a [`PasswordHasher`].
    pub fn from_hash(digest: &str) -> DomainResult<Self> {
        Ok(Self {
            digest: require_not_blank(digest, "password hash cannot be empty")?,
        })
    }

    pub fn matches(&self, plain: &str, hasher: &dyn PasswordHasher) -> bool {
        hasher.verify(plain, &self.digest)
    }

    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl ValueObject for Password {}

impl TryFrom<String> for Password {
    type Error = DomainError;

    fn try_from(digest: String) -> Result<Self, Self::Error> {
        Password::from_hash(&digest)
    }
}

impl From<Password> for String {
    fn from(value: Password) -> Self {
        value.digest
    }
}

impl core::fmt::Display for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("********")
    }
}

impl core::fmt::Debug for Password {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("Password(********)")
    }
}

/// Composition policy, checked in order; the first failure wins.
pub fn validate_policy(plain: &str) -> DomainResult<()> {
    require_not_blank(plain, "password cannot be empty")?;

    let failure = if plain.chars().count() < MIN_LENGTH {
        Some("password must be at least 8 characters long")
    } else if !plain.chars().any(|c| c.is_ascii_uppercase()) {
        Some("password must contain at least one uppercase letter")
    } else if !plain.chars().any(|c| c.is_ascii_lowercase()) {
        Some("password must contain at least one lowercase letter")
    } else if !plain.chars().any(|c| c.is_ascii_digit()) {
        Some("password must contain at least one digit")
    } else if !plain.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        Some("password must contain at least one special character")
    } else {
        None
    };

    match failure {
        Some(message) => Err(DomainError::validation(message)),
        None => Ok(()),
    }
}
