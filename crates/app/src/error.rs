use thiserror::Error;

use salesdesk_auth::CredentialError;
use salesdesk_core::DomainError;

use crate::ports::StorageError;

pub type AppResult<T> = Result<T, AppError>;

/// Failure of an application operation.
#[derive(Debug, Error)]
pub enum AppError {
    /// A domain rule rejected the input or the current state.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// The hashing collaborator failed.
    #[error(transparent)]
    Credential(CredentialError),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    /// The operation would break a uniqueness rule.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unknown login or wrong password. Deliberately does not say which.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl AppError {
    pub fn not_found(entity: &'static str, key: impl core::fmt::Display) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }
}

impl From<CredentialError> for AppError {
    fn from(value: CredentialError) -> Self {
        match value {
            CredentialError::Domain(err) => AppError::Domain(err),
            other => AppError::Credential(other),
        }
    }
}
