use salesdesk_core::DomainError;

/// Failure while building or checking a credential.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CredentialError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    /// The hashing primitive itself failed (bad cost, RNG failure, ...).
    #[error("password hashing failed: {0}")]
    Hashing(String),
}
