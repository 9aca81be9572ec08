//! Collaborator ports consumed by the services.
//!
//! Repositories are synchronous and `Send + Sync`; `save` assigns a storage id
//! the first time an aggregate is persisted and returns the stored copy.

use chrono::{DateTime, Utc};
use thiserror::Error;

use salesdesk_auth::{Email, Token, User};
use salesdesk_core::{Entity, EntityId};
use salesdesk_customers::Customer;
use salesdesk_products::Product;
use salesdesk_sales::Sale;

/// The backing store failed. Never caused by the aggregate itself.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("storage failure: {0}")]
pub struct StorageError(pub String);

impl StorageError {
    pub fn poisoned() -> Self {
        Self("lock poisoned".to_string())
    }
}

/// A notification could not be handed over for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("delivery failed: {0}")]
pub struct DeliveryError(pub String);

// ─────────────────────────────────────────────────────────────────────────────
// Repositories
// ─────────────────────────────────────────────────────────────────────────────

pub trait CustomerRepository: Send + Sync {
    fn save(&self, customer: Customer) -> Result<Customer, StorageError>;
    fn find_by_id(&self, id: EntityId) -> Result<Option<Customer>, StorageError>;
    fn find_by_code(&self, code: &str) -> Result<Option<Customer>, StorageError>;
    fn find_by_cpf(&self, cpf: &str) -> Result<Option<Customer>, StorageError>;
    /// `email` is compared against the stored lower-cased address.
    fn find_by_email(&self, email: &str) -> Result<Option<Customer>, StorageError>;
    fn delete(&self, id: EntityId) -> Result<(), StorageError>;
    fn find_all(&self) -> Result<Vec<Customer>, StorageError>;

    /// Customers registered in `[from, to)`.
    fn find_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Customer>, StorageError> {
        let mut found = self.find_all()?;
        found.retain(|c| (from..to).contains(&c.created_at()));
        Ok(found)
    }

    fn exists_by_cpf(&self, cpf: &str) -> Result<bool, StorageError> {
        Ok(self.find_by_cpf(cpf)?.is_some())
    }

    fn exists_by_email(&self, email: &str) -> Result<bool, StorageError> {
        Ok(self.find_by_email(email)?.is_some())
    }
}

pub trait ProductRepository: Send + Sync {
    fn save(&self, product: Product) -> Result<Product, StorageError>;
    fn find_by_id(&self, id: EntityId) -> Result<Option<Product>, StorageError>;
    fn find_by_code(&self, code: &str) -> Result<Option<Product>, StorageError>;
    fn delete(&self, id: EntityId) -> Result<(), StorageError>;
    fn find_all(&self) -> Result<Vec<Product>, StorageError>;

    fn exists_by_code(&self, code: &str) -> Result<bool, StorageError> {
        Ok(self.find_by_code(code)?.is_some())
    }
}

pub trait SaleRepository: Send + Sync {
    fn save(&self, sale: Sale) -> Result<Sale, StorageError>;
    fn find_by_id(&self, id: EntityId) -> Result<Option<Sale>, StorageError>;
    fn find_by_code(&self, code: &str) -> Result<Option<Sale>, StorageError>;
    fn delete(&self, id: EntityId) -> Result<(), StorageError>;
    fn find_all(&self) -> Result<Vec<Sale>, StorageError>;

    /// Sales recorded in `[from, to)`.
    fn find_created_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Sale>, StorageError> {
        let mut found = self.find_all()?;
        found.retain(|s| (from..to).contains(&s.created_at()));
        Ok(found)
    }

    fn exists_by_code(&self, code: &str) -> Result<bool, StorageError> {
        Ok(self.find_by_code(code)?.is_some())
    }
}

pub trait UserRepository: Send + Sync {
    fn save(&self, user: User) -> Result<User, StorageError>;
    fn find_by_id(&self, id: EntityId) -> Result<Option<User>, StorageError>;
    fn find_by_email(&self, email: &Email) -> Result<Option<User>, StorageError>;
    fn find_by_customer_code(&self, customer_code: &str) -> Result<Option<User>, StorageError>;
    /// Matches the pending token value regardless of expiry.
    fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, StorageError>;
    fn delete(&self, id: EntityId) -> Result<(), StorageError>;

    fn exists_by_email(&self, email: &Email) -> Result<bool, StorageError> {
        Ok(self.find_by_email(email)?.is_some())
    }

    fn exists_by_customer_code(&self, customer_code: &str) -> Result<bool, StorageError> {
        Ok(self.find_by_customer_code(customer_code)?.is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Other collaborators
// ─────────────────────────────────────────────────────────────────────────────

/// Issues opaque tokens.
pub trait TokenIssuer: Send + Sync {
    /// Bearer token handed out on a successful login.
    fn access_token(&self, user: &User) -> String;

    /// Single-use value for the password reset flow.
    fn reset_token(&self) -> String;
}

/// Access tokens that were signed out and must no longer be honoured.
pub trait TokenBlacklist: Send + Sync {
    fn revoke(&self, token: &str) -> Result<(), StorageError>;

    fn is_revoked(&self, token: &str) -> Result<bool, StorageError>;
}

/// Outbound messages. Callers treat failures as best-effort.
pub trait Notifier: Send + Sync {
    fn send_reset_password(&self, to: &Email, token: &Token) -> Result<(), DeliveryError>;

    fn send_welcome(&self, to: &Email, customer_name: &str) -> Result<(), DeliveryError>;
}

/// Next business codes (`CUST0001`, `PROD0001`, ...).
pub trait CodeGenerator: Send + Sync {
    fn next_customer_code(&self) -> Result<String, StorageError>;

    fn next_product_code(&self) -> Result<String, StorageError>;
}
