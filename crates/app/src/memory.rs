//! In-memory adapters for tests/dev.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Mutex, RwLock};

use uuid::Uuid;

use salesdesk_auth::{Email, Token, User};
use salesdesk_core::{Entity, EntityId};
use salesdesk_customers::Customer;
use salesdesk_products::Product;
use salesdesk_sales::Sale;

use crate::ports::{
    CodeGenerator, CustomerRepository, DeliveryError, Notifier, ProductRepository, SaleRepository,
    StorageError, TokenBlacklist, TokenIssuer, UserRepository,
};

// ─────────────────────────────────────────────────────────────────────────────
// Table
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
struct Rows<T> {
    by_id: HashMap<EntityId, T>,
    last_id: i64,
}

/// Id-keyed rows with a storage-assigned sequence starting at 1.
#[derive(Debug)]
struct Table<T> {
    inner: RwLock<Rows<T>>,
}

impl<T> Table<T>
where
    T: Entity + Clone,
{
    fn new() -> Self {
        Self {
            inner: RwLock::new(Rows {
                by_id: HashMap::new(),
                last_id: 0,
            }),
        }
    }

    fn save(&self, mut row: T) -> Result<T, StorageError> {
        let mut rows = self.inner.write().map_err(|_| StorageError::poisoned())?;
        let id = match row.id() {
            Some(id) => id,
            None => {
                rows.last_id += 1;
                let id = EntityId::new(rows.last_id);
                row.meta_mut().assign_id(id);
                id
            }
        };
        rows.by_id.insert(id, row.clone());
        Ok(row)
    }

    fn get(&self, id: EntityId) -> Result<Option<T>, StorageError> {
        let rows = self.inner.read().map_err(|_| StorageError::poisoned())?;
        Ok(rows.by_id.get(&id).cloned())
    }

    fn find(&self, predicate: impl Fn(&T) -> bool) -> Result<Option<T>, StorageError> {
        let rows = self.inner.read().map_err(|_| StorageError::poisoned())?;
        Ok(rows.by_id.values().find(|&row| predicate(row)).cloned())
    }

    /// Every row, in id order.
    fn all(&self) -> Result<Vec<T>, StorageError> {
        let rows = self.inner.read().map_err(|_| StorageError::poisoned())?;
        let mut all: Vec<T> = rows.by_id.values().cloned().collect();
        all.sort_by_key(|row| row.id());
        Ok(all)
    }

    fn remove(&self, id: EntityId) -> Result<(), StorageError> {
        let mut rows = self.inner.write().map_err(|_| StorageError::poisoned())?;
        rows.by_id.remove(&id);
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.read().map(|rows| rows.by_id.len()).unwrap_or(0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repositories
// ─────────────────────────────────────────────────────────────────────────────

macro_rules! in_memory_repository {
    ($name:ident, $entity:ty) => {
        #[derive(Debug)]
        pub struct $name {
            table: Table<$entity>,
        }

        impl $name {
            pub fn new() -> Self {
                Self { table: Table::new() }
            }

            pub fn len(&self) -> usize {
                self.table.len()
            }

            pub fn is_empty(&self) -> bool {
                self.len() == 0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

in_memory_repository!(InMemoryCustomerRepository, Customer);
in_memory_repository!(InMemoryProductRepository, Product);
in_memory_repository!(InMemorySaleRepository, Sale);
in_memory_repository!(InMemoryUserRepository, User);

impl CustomerRepository for InMemoryCustomerRepository {
    fn save(&self, customer: Customer) -> Result<Customer, StorageError> {
        self.table.save(customer)
    }

    fn find_by_id(&self, id: EntityId) -> Result<Option<Customer>, StorageError> {
        self.table.get(id)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Customer>, StorageError> {
        self.table.find(|c| c.code() == code)
    }

    fn find_by_cpf(&self, cpf: &str) -> Result<Option<Customer>, StorageError> {
        self.table.find(|c| c.document().cpf() == cpf)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Customer>, StorageError> {
        let email = email.to_lowercase();
        self.table.find(|c| c.email() == email)
    }

    fn delete(&self, id: EntityId) -> Result<(), StorageError> {
        self.table.remove(id)
    }

    fn find_all(&self) -> Result<Vec<Customer>, StorageError> {
        self.table.all()
    }
}

impl ProductRepository for InMemoryProductRepository {
    fn save(&self, product: Product) -> Result<Product, StorageError> {
        self.table.save(product)
    }

    fn find_by_id(&self, id: EntityId) -> Result<Option<Product>, StorageError> {
        self.table.get(id)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Product>, StorageError> {
        self.table.find(|p| p.code() == code)
    }

    fn delete(&self, id: EntityId) -> Result<(), StorageError> {
        self.table.remove(id)
    }

    fn find_all(&self) -> Result<Vec<Product>, StorageError> {
        self.table.all()
    }
}

impl SaleRepository for InMemorySaleRepository {
    fn save(&self, sale: Sale) -> Result<Sale, StorageError> {
        self.table.save(sale)
    }

    fn find_by_id(&self, id: EntityId) -> Result<Option<Sale>, StorageError> {
        self.table.get(id)
    }

    fn find_by_code(&self, code: &str) -> Result<Option<Sale>, StorageError> {
        self.table.find(|s| s.code() == code)
    }

    fn delete(&self, id: EntityId) -> Result<(), StorageError> {
        self.table.remove(id)
    }

    fn find_all(&self) -> Result<Vec<Sale>, StorageError> {
        self.table.all()
    }
}

impl UserRepository for InMemoryUserRepository {
    fn save(&self, user: User) -> Result<User, StorageError> {
        self.table.save(user)
    }

    fn find_by_id(&self, id: EntityId) -> Result<Option<User>, StorageError> {
        self.table.get(id)
    }

    fn find_by_email(&self, email: &Email) -> Result<Option<User>, StorageError> {
        self.table.find(|u| u.email() == email)
    }

    fn find_by_customer_code(&self, customer_code: &str) -> Result<Option<User>, StorageError> {
        self.table.find(|u| u.customer_code() == customer_code)
    }

    fn find_by_reset_token(&self, token: &str) -> Result<Option<User>, StorageError> {
        self.table
            .find(|u| u.reset_token().is_some_and(|t| t.value() == token))
    }

    fn delete(&self, id: EntityId) -> Result<(), StorageError> {
        self.table.remove(id)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Collaborators
// ─────────────────────────────────────────────────────────────────────────────

/// Process-local counters: `CUST0001`, `CUST0002`, ... and `PROD0001`, ...
#[derive(Debug, Default)]
pub struct SequentialCodeGenerator {
    customers: AtomicU32,
    products: AtomicU32,
}

impl SequentialCodeGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues after codes already handed out (e.g. loaded from storage).
    pub fn starting_after(last_customer: u32, last_product: u32) -> Self {
        Self {
            customers: AtomicU32::new(last_customer),
            products: AtomicU32::new(last_product),
        }
    }
}

impl CodeGenerator for SequentialCodeGenerator {
    fn next_customer_code(&self) -> Result<String, StorageError> {
        let n = self.customers.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("CUST{n:04}"))
    }

    fn next_product_code(&self) -> Result<String, StorageError> {
        let n = self.products.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("PROD{n:04}"))
    }
}

/// Random opaque tokens. Access tokens are time-ordered (v7), reset tokens
/// are fully random (v4).
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidTokenIssuer;

impl TokenIssuer for UuidTokenIssuer {
    fn access_token(&self, _user: &User) -> String {
        Uuid::now_v7().simple().to_string()
    }

    fn reset_token(&self) -> String {
        Uuid::new_v4().simple().to_string()
    }
}

/// Revoked tokens held in a process-local set.
#[derive(Debug, Default)]
pub struct InMemoryTokenBlacklist {
    revoked: RwLock<HashSet<String>>,
}

impl InMemoryTokenBlacklist {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenBlacklist for InMemoryTokenBlacklist {
    fn revoke(&self, token: &str) -> Result<(), StorageError> {
        let mut revoked = self.revoked.write().map_err(|_| StorageError::poisoned())?;
        revoked.insert(token.to_string());
        Ok(())
    }

    fn is_revoked(&self, token: &str) -> Result<bool, StorageError> {
        let revoked = self.revoked.read().map_err(|_| StorageError::poisoned())?;
        Ok(revoked.contains(token))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    ResetPassword { to: String, token: String },
    Welcome { to: String, customer_name: String },
}

/// Logs and records every message instead of sending it.
#[derive(Debug, Default)]
pub struct LoggingNotifier {
    sent: Mutex<Vec<Delivery>>,
    fail: bool,
}

impl LoggingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects every message; nothing is recorded.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn deliveries(&self) -> Vec<Delivery> {
        self.sent.lock().map(|sent| sent.clone()).unwrap_or_default()
    }

    fn record(&self, delivery: Delivery) -> Result<(), DeliveryError> {
        if self.fail {
            return Err(DeliveryError("notifier configured to fail".to_string()));
        }
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| DeliveryError("lock poisoned".to_string()))?;
        sent.push(delivery);
        Ok(())
    }
}

impl Notifier for LoggingNotifier {
    fn send_reset_password(&self, to: &Email, token: &Token) -> Result<(), DeliveryError> {
        tracing::info!(to = %to, expires_at = %token.expires_at(), "reset password email");
        self.record(Delivery::ResetPassword {
            to: to.to_string(),
            token: token.value().to_string(),
        })
    }

    fn send_welcome(&self, to: &Email, customer_name: &str) -> Result<(), DeliveryError> {
        tracing::info!(to = %to, customer_name, "welcome email");
        self.record(Delivery::Welcome {
            to: to.to_string(),
            customer_name: customer_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use salesdesk_auth::Password;

    fn user(code: &str, email: &str) -> User {
        User::new(
            code,
            Email::new(email).unwrap(),
            Password::from_hash("digest").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn save_assigns_sequential_ids_once() {
        let repo = InMemoryUserRepository::new();
        let first = repo.save(user("CUST0001", "a@example.com")).unwrap();
        let second = repo.save(user("CUST0002", "b@example.com")).unwrap();
        assert_eq!(first.id(), Some(EntityId::new(1)));
        assert_eq!(second.id(), Some(EntityId::new(2)));

        let mut again = first.clone();
        again.deactivate();
        let again = repo.save(again).unwrap();
        assert_eq!(again.id(), Some(EntityId::new(1)));
        assert_eq!(repo.len(), 2);
        assert!(!repo.find_by_id(EntityId::new(1)).unwrap().unwrap().is_active());
    }

    #[test]
    fn user_lookups() {
        let repo = InMemoryUserRepository::new();
        let mut saved = repo.save(user("CUST0001", "a@example.com")).unwrap();
        saved
            .generate_reset_password_token("tok", Utc::now() + Duration::hours(1))
            .unwrap();
        repo.save(saved).unwrap();

        let email = Email::new("A@Example.com").unwrap();
        assert!(repo.exists_by_email(&email).unwrap());
        assert!(repo.exists_by_customer_code("CUST0001").unwrap());
        assert!(!repo.exists_by_customer_code("CUST0002").unwrap());
        assert!(repo.find_by_reset_token("tok").unwrap().is_some());
        assert!(repo.find_by_reset_token("other").unwrap().is_none());

        repo.delete(EntityId::new(1)).unwrap();
        assert!(repo.is_empty());
        repo.delete(EntityId::new(1)).unwrap();
    }

    #[test]
    fn find_all_lists_rows_in_id_order() {
        let repo = InMemoryUserRepository::new();
        for i in 1..=12 {
            repo.save(user(&format!("CUST{i:04}"), &format!("u{i}@example.com"))).unwrap();
        }
        repo.delete(EntityId::new(5)).unwrap();

        let all = repo.table.all().unwrap();
        assert_eq!(all.len(), 11);
        let ids: Vec<i64> = all.iter().filter_map(|u| u.id()).map(|id| id.value()).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 6, 7, 8, 9, 10, 11, 12]);
    }

    #[test]
    fn blacklist_remembers_revoked_tokens() {
        let blacklist = InMemoryTokenBlacklist::new();
        assert!(!blacklist.is_revoked("abc").unwrap());
        blacklist.revoke("abc").unwrap();
        blacklist.revoke("abc").unwrap();
        assert!(blacklist.is_revoked("abc").unwrap());
        assert!(!blacklist.is_revoked("ABC").unwrap());
    }

    #[test]
    fn code_generator_pads_to_four_digits() {
        let codes = SequentialCodeGenerator::new();
        assert_eq!(codes.next_customer_code().unwrap(), "CUST0001");
        assert_eq!(codes.next_customer_code().unwrap(), "CUST0002");
        assert_eq!(codes.next_product_code().unwrap(), "PROD0001");

        let resumed = SequentialCodeGenerator::starting_after(41, 9999);
        assert_eq!(resumed.next_customer_code().unwrap(), "CUST0042");
        assert_eq!(resumed.next_product_code().unwrap(), "PROD10000");
    }

    #[test]
    fn tokens_are_unique_and_opaque() {
        let issuer = UuidTokenIssuer;
        let a = issuer.reset_token();
        let b = issuer.reset_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(issuer.access_token(&user("CUST0001", "a@example.com")), a);
    }

    #[test]
    fn notifier_records_or_fails() {
        let to = Email::new("a@example.com").unwrap();

        let notifier = LoggingNotifier::new();
        notifier.send_welcome(&to, "Alice").unwrap();
        assert_eq!(
            notifier.deliveries(),
            vec![Delivery::Welcome {
                to: "a@example.com".into(),
                customer_name: "Alice".into()
            }]
        );

        let failing = LoggingNotifier::failing();
        assert!(failing.send_welcome(&to, "Alice").is_err());
        assert!(failing.deliveries().is_empty());
    }
}
