use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use salesdesk_core::money::require_positive;
use salesdesk_core::text::require_not_blank;
use salesdesk_core::{DomainError, DomainResult, EntityId};

/// Sale line: a product snapshot, a quantity and the unit price charged.
///
/// Lines compare equal when they refer to the same product code. A line is
/// immutable once built; edits replace the whole item list on the sale.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSaleItem")]
pub struct SaleItem {
    id: Option<EntityId>,
    product_code: String,
    product_name: String,
    quantity: i64,
    unit_price: Decimal,
}

#[derive(Deserialize)]
struct RawSaleItem {
    #[serde(default)]
    id: Option<EntityId>,
    product_code: String,
    product_name: String,
    quantity: i64,
    unit_price: Decimal,
}

impl TryFrom<RawSaleItem> for SaleItem {
    type Error = DomainError;

    fn try_from(raw: RawSaleItem) -> Result<Self, Self::Error> {
        SaleItem::restore(raw.id, &raw.product_code, &raw.product_name, raw.quantity, raw.unit_price)
    }
}

impl SaleItem {
    pub fn new(
        product_code: &str,
        product_name: &str,
        quantity: i64,
        unit_price: Decimal,
    ) -> DomainResult<Self> {
        let item = Self {
            id: None,
            product_code: require_not_blank(product_code, "product code cannot be empty")?,
            product_name: require_not_blank(product_name, "product name cannot be empty")?,
            quantity: validate_quantity(quantity)?,
            unit_price: require_positive(unit_price, "price")?,
        };
        if item.unit_price.checked_mul(Decimal::from(item.quantity)).is_none() {
            return Err(DomainError::validation("item total is too large"));
        }
        Ok(item)
    }

    /// Rehydrates a stored line, keeping its storage id.
    pub fn restore(
        id: Option<EntityId>,
        product_code: &str,
        product_name: &str,
        quantity: i64,
        unit_price: Decimal,
    ) -> DomainResult<Self> {
        Ok(Self {
            id,
            ..Self::new(product_code, product_name, quantity, unit_price)?
        })
    }

    /// `unit_price × quantity`, unrounded. Construction rejects lines whose
    /// total does not fit a [`Decimal`].
    pub fn total_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }

    pub fn id(&self) -> Option<EntityId> {
        self.id
    }

    pub fn product_code(&self) -> &str {
        &self.product_code
    }

    pub fn product_name(&self) -> &str {
        &self.product_name
    }

    pub fn quantity(&self) -> i64 {
        self.quantity
    }

    pub fn unit_price(&self) -> Decimal {
        self.unit_price
    }
}

impl PartialEq for SaleItem {
    fn eq(&self, other: &Self) -> bool {
        self.product_code == other.product_code
    }
}

fn validate_quantity(quantity: i64) -> DomainResult<i64> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }
    Ok(quantity)
}
