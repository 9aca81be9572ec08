use serde::{Deserialize, Serialize};

use salesdesk_core::text::{exact_digits, require_not_blank};
use salesdesk_core::{DomainError, DomainResult, ValueObject};

/// Raw address input, as received from a caller or a storage row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressFields {
    pub zip_code: String,
    pub street: String,
    pub number: String,
    pub complement: Option<String>,
    pub neighborhood: String,
    pub city: String,
    pub state: String,
}

/// Validated postal address.
///
/// Two addresses are equal when zip code, street and number match; the
/// remaining fields are descriptive.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "AddressFields")]
pub struct Address {
    zip_code: String,
    street: String,
    number: String,
    complement: Option<String>,
    neighborhood: String,
    city: String,
    state: String,
}

impl Address {
    pub fn new(fields: AddressFields) -> DomainResult<Self> {
        Ok(Self {
            zip_code: exact_digits(
                &fields.zip_code,
                8,
                "zip code cannot be empty",
                "zip code must have 8 digits",
            )?,
            street: require_not_blank(&fields.street, "street cannot be empty")?,
            number: require_not_blank(&fields.number, "number cannot be empty")?,
            complement: fields.complement,
            neighborhood: require_not_blank(&fields.neighborhood, "neighborhood cannot be empty")?,
            city: require_not_blank(&fields.city, "city cannot be empty")?,
            state: validate_state(&fields.state)?,
        })
    }

    pub fn zip_code(&self) -> &str {
        &self.zip_code
    }

    pub fn street(&self) -> &str {
        &self.street
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn complement(&self) -> Option<&str> {
        self.complement.as_deref()
    }

    pub fn neighborhood(&self) -> &str {
        &self.neighborhood
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// `00000-000`
    pub fn formatted_zip_code(&self) -> String {
        format!("{}-{}", &self.zip_code[..5], &self.zip_code[5..])
    }
}

impl TryFrom<AddressFields> for Address {
    type Error = DomainError;

    fn try_from(fields: AddressFields) -> Result<Self, Self::Error> {
        Address::new(fields)
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.zip_code == other.zip_code && self.street == other.street && self.number == other.number
    }
}

impl ValueObject for Address {}

/// `Rua A, 10 (apto 3) - Centro, São Paulo/SP - CEP: 01310-100`
impl core::fmt::Display for Address {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}, {}", self.street, self.number)?;
        if let Some(complement) = self.complement.as_deref().filter(|c| !c.trim().is_empty()) {
            write!(f, " ({complement})")?;
        }
        write!(
            f,
            " - {}, {}/{} - CEP: {}",
            self.neighborhood,
            self.city,
            self.state,
            self.formatted_zip_code()
        )
    }
}

fn validate_state(raw: &str) -> DomainResult<String> {
    let state = require_not_blank(raw, "state cannot be empty")?;
    let state = state.trim();
    if state.chars().count() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(DomainError::validation("state must have 2 letters"));
    }
    Ok(state.to_ascii_uppercase())
}
