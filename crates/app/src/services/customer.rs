use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use salesdesk_core::{Entity, EntityId};
use salesdesk_customers::{Customer, CustomerDetails, Document};

use crate::error::{AppError, AppResult};
use crate::ports::{CodeGenerator, CustomerRepository};

/// Command: CreateCustomer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub cpf: String,
    pub rg: String,
    pub details: CustomerDetails,
}

pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
    codes: Arc<dyn CodeGenerator>,
}

impl CustomerService {
    pub fn new(customers: Arc<dyn CustomerRepository>, codes: Arc<dyn CodeGenerator>) -> Self {
        Self { customers, codes }
    }

    /// Rejects a CPF or e-mail already on file, then stores the customer
    /// under the next generated code.
    pub fn create(&self, cmd: CreateCustomer) -> AppResult<Customer> {
        let document = Document::new(&cmd.cpf, &cmd.rg)?;
        if self.customers.exists_by_cpf(document.cpf())? {
            warn!(cpf = %document.formatted_cpf(), "duplicate cpf");
            return Err(AppError::conflict("cpf already registered"));
        }
        if self.customers.exists_by_email(&cmd.details.email)? {
            warn!(email = %cmd.details.email, "duplicate customer email");
            return Err(AppError::conflict("email already registered"));
        }

        let code = self.codes.next_customer_code()?;
        let saved = self.customers.save(Customer::new(code, document, cmd.details)?)?;

        info!(id = ?saved.id(), code = %saved.code(), "customer created");
        Ok(saved)
    }

    /// Replaces the editable fields. The e-mail may not belong to another
    /// customer.
    pub fn update(&self, id: EntityId, details: CustomerDetails) -> AppResult<Customer> {
        let mut customer = self.find(id)?;
        customer.update_info(details)?;

        if let Some(owner) = self.customers.find_by_email(customer.email())? {
            if owner.id() != customer.id() {
                warn!(id = %id, email = %customer.email(), "email taken by another customer");
                return Err(AppError::conflict("email already registered"));
            }
        }

        let saved = self.customers.save(customer)?;
        info!(id = %id, code = %saved.code(), "customer updated");
        Ok(saved)
    }

    pub fn find(&self, id: EntityId) -> AppResult<Customer> {
        self.customers
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("customer", id))
    }

    pub fn find_by_code(&self, code: &str) -> AppResult<Customer> {
        self.customers
            .find_by_code(code)?
            .ok_or_else(|| AppError::not_found("customer", code))
    }

    pub fn delete(&self, id: EntityId) -> AppResult<()> {
        let customer = self.find(id)?;
        self.customers.delete(id)?;
        info!(id = %id, code = %customer.code(), "customer deleted");
        Ok(())
    }
}
