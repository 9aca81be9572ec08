use std::sync::LazyLock;

use chrono::{Months, NaiveDate, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use salesdesk_core::text::{exact_digits, require_not_blank};
use salesdesk_core::{DomainError, DomainResult, Entity, EntityMeta};

use crate::address::Address;
use crate::document::Document;

static CONTACT_EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9+_.-]+@(.+)$").unwrap());

const MAX_AGE_YEARS: u32 = 150;

/// Mutable customer fields, shared by creation and `update_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub full_name: String,
    pub mother_name: String,
    pub address: Address,
    pub birth_date: NaiveDate,
    pub cell_phone: String,
    pub email: String,
}

/// Aggregate root: Customer.
///
/// The document is fixed at creation; every other field is re-validated as a
/// whole on update, so a failed update leaves the customer untouched.
#[derive(Debug, Clone, Serialize)]
pub struct Customer {
    meta: EntityMeta,
    document: Document,
    full_name: String,
    mother_name: String,
    address: Address,
    birth_date: NaiveDate,
    cell_phone: String,
    email: String,
}

impl Customer {
    pub fn new(code: impl Into<String>, document: Document, details: CustomerDetails) -> DomainResult<Self> {
        Self::new_at(code, document, details, today())
    }

    /// Like [`Customer::new`] with an explicit "today" for the birth date rules.
    pub fn new_at(
        code: impl Into<String>,
        document: Document,
        details: CustomerDetails,
        today: NaiveDate,
    ) -> DomainResult<Self> {
        Self::build(EntityMeta::new(code), document, details, today)
    }

    /// Rehydrates a stored customer. Field rules still apply.
    pub fn restore(meta: EntityMeta, document: Document, details: CustomerDetails) -> DomainResult<Self> {
        Self::build(meta, document, details, today())
    }

    fn build(
        meta: EntityMeta,
        document: Document,
        details: CustomerDetails,
        today: NaiveDate,
    ) -> DomainResult<Self> {
        let valid = validate_details(details, today)?;
        Ok(Self {
            meta,
            document,
            full_name: valid.full_name,
            mother_name: valid.mother_name,
            address: valid.address,
            birth_date: valid.birth_date,
            cell_phone: valid.cell_phone,
            email: valid.email,
        })
    }

    pub fn update_info(&mut self, details: CustomerDetails) -> DomainResult<()> {
        self.update_info_at(details, today())
    }

    pub fn update_info_at(&mut self, details: CustomerDetails, today: NaiveDate) -> DomainResult<()> {
        let valid = validate_details(details, today)?;
        self.full_name = valid.full_name;
        self.mother_name = valid.mother_name;
        self.address = valid.address;
        self.birth_date = valid.birth_date;
        self.cell_phone = valid.cell_phone;
        self.email = valid.email;
        Ok(())
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn mother_name(&self) -> &str {
        &self.mother_name
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    /// Eleven digits, area code first.
    pub fn cell_phone(&self) -> &str {
        &self.cell_phone
    }

    /// `(00) 00000-0000`
    pub fn formatted_cell_phone(&self) -> String {
        let p = &self.cell_phone;
        format!("({}) {}-{}", &p[..2], &p[2..7], &p[7..])
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl Entity for Customer {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn validate_details(details: CustomerDetails, today: NaiveDate) -> DomainResult<CustomerDetails> {
    Ok(CustomerDetails {
        full_name: require_not_blank(&details.full_name, "full name cannot be empty")?,
        mother_name: require_not_blank(&details.mother_name, "mother name cannot be empty")?,
        address: details.address,
        birth_date: validate_birth_date(details.birth_date, today)?,
        cell_phone: exact_digits(
            &details.cell_phone,
            11,
            "cell phone cannot be empty",
            "cell phone must have 11 digits",
        )?,
        email: validate_email(&details.email)?,
    })
}

fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> DomainResult<NaiveDate> {
    if birth_date > today {
        return Err(DomainError::validation("birth date cannot be in the future"));
    }
    let oldest = today
        .checked_sub_months(Months::new(MAX_AGE_YEARS * 12))
        .unwrap_or(NaiveDate::MIN);
    if birth_date < oldest {
        return Err(DomainError::validation("invalid birth date"));
    }
    Ok(birth_date)
}

fn validate_email(raw: &str) -> DomainResult<String> {
    require_not_blank(raw, "email cannot be empty")?;
    if !CONTACT_EMAIL.is_match(raw) {
        return Err(DomainError::validation("invalid email format"));
    }
    Ok(raw.to_lowercase())
}
