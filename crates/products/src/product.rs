use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use salesdesk_core::money::{require_positive, round_half_up};
use salesdesk_core::text::require_not_blank;
use salesdesk_core::{DomainError, DomainResult, Entity, EntityMeta};

use crate::category::ProductCategory;
use crate::dimensions::Dimensions;

/// Descriptive and pricing fields, shared by construction and `update_info`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    pub name: String,
    pub category: ProductCategory,
    pub details: Option<String>,
    pub weight: Decimal,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub dimensions: Dimensions,
    /// Free-text destination / shipping label.
    pub destination: Option<String>,
}

/// Command: CreateProduct, from raw catalog input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub name: String,
    /// Category name or display label.
    pub category: String,
    pub details: Option<String>,
    pub weight: Decimal,
    pub purchase_price: Decimal,
    pub sale_price: Decimal,
    pub height: Decimal,
    pub width: Decimal,
    pub depth: Decimal,
    pub destination: Option<String>,
    pub initial_stock: i64,
}

/// Aggregate root: Product.
///
/// Stock starts at zero and only moves through [`Product::add_stock`] and
/// [`Product::remove_stock`]; it can never go negative.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    meta: EntityMeta,
    name: String,
    category: ProductCategory,
    details: Option<String>,
    weight: Decimal,
    purchase_price: Decimal,
    sale_price: Decimal,
    dimensions: Dimensions,
    destination: Option<String>,
    stock_quantity: i64,
    profit_margin: Decimal,
}

impl Product {
    pub fn new(code: impl Into<String>, info: ProductInfo) -> DomainResult<Self> {
        Self::build(EntityMeta::new(code), info, 0)
    }

    /// Parses category and dimensions, builds the product and books the
    /// initial stock when positive.
    pub fn create(code: impl Into<String>, cmd: &CreateProduct) -> DomainResult<Self> {
        let category: ProductCategory = cmd.category.parse()?;
        let dimensions = Dimensions::new(cmd.height, cmd.width, cmd.depth)?;

        let mut product = Self::new(
            code,
            ProductInfo {
                name: cmd.name.clone(),
                category,
                details: cmd.details.clone(),
                weight: cmd.weight,
                purchase_price: cmd.purchase_price,
                sale_price: cmd.sale_price,
                dimensions,
                destination: cmd.destination.clone(),
            },
        )?;

        if cmd.initial_stock > 0 {
            product.add_stock(cmd.initial_stock)?;
        }
        Ok(product)
    }

    /// Rehydrates a stored product; a missing stock column reads as zero.
    pub fn restore(meta: EntityMeta, info: ProductInfo, stock_quantity: Option<i64>) -> DomainResult<Self> {
        let stock = stock_quantity.unwrap_or(0);
        if stock < 0 {
            return Err(DomainError::validation("stock quantity cannot be negative"));
        }
        Self::build(meta, info, stock)
    }

    fn build(meta: EntityMeta, info: ProductInfo, stock_quantity: i64) -> DomainResult<Self> {
        let (info, profit_margin) = validate_info(info)?;
        Ok(Self {
            meta,
            name: info.name,
            category: info.category,
            details: info.details,
            weight: info.weight,
            purchase_price: info.purchase_price,
            sale_price: info.sale_price,
            dimensions: info.dimensions,
            destination: info.destination,
            stock_quantity,
            profit_margin,
        })
    }

    /// Replaces every descriptive and pricing field. Stock is untouched.
    pub fn update_info(&mut self, info: ProductInfo) -> DomainResult<()> {
        let (info, profit_margin) = validate_info(info)?;
        self.name = info.name;
        self.category = info.category;
        self.details = info.details;
        self.weight = info.weight;
        self.purchase_price = info.purchase_price;
        self.sale_price = info.sale_price;
        self.dimensions = info.dimensions;
        self.destination = info.destination;
        self.profit_margin = profit_margin;
        Ok(())
    }

    pub fn add_stock(&mut self, quantity: i64) -> DomainResult<()> {
        require_positive_quantity(quantity)?;
        self.stock_quantity = self
            .stock_quantity
            .checked_add(quantity)
            .ok_or_else(|| DomainError::validation("stock quantity overflow"))?;
        Ok(())
    }

    pub fn remove_stock(&mut self, quantity: i64) -> DomainResult<()> {
        require_positive_quantity(quantity)?;
        if self.stock_quantity < quantity {
            return Err(DomainError::validation("insufficient stock"));
        }
        self.stock_quantity -= quantity;
        Ok(())
    }

    pub fn has_stock(&self, quantity: i64) -> bool {
        self.stock_quantity >= quantity
    }

    /// Sale price minus purchase price.
    pub fn profit(&self) -> Decimal {
        self.sale_price - self.purchase_price
    }

    /// Profit over purchase price as a percentage, half-up to two places.
    pub fn profit_margin(&self) -> Decimal {
        self.profit_margin
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> ProductCategory {
        self.category
    }

    pub fn details(&self) -> Option<&str> {
        self.details.as_deref()
    }

    pub fn weight(&self) -> Decimal {
        self.weight
    }

    pub fn purchase_price(&self) -> Decimal {
        self.purchase_price
    }

    pub fn sale_price(&self) -> Decimal {
        self.sale_price
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn stock_quantity(&self) -> i64 {
        self.stock_quantity
    }
}

impl Entity for Product {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

fn require_positive_quantity(quantity: i64) -> DomainResult<()> {
    if quantity <= 0 {
        return Err(DomainError::validation("quantity must be greater than zero"));
    }
    Ok(())
}

/// `profit × 100 / purchase`, rounded once. The division itself keeps 28
/// significant digits, so a tie beyond that precision is not seen.
fn margin_percent(purchase_price: Decimal, sale_price: Decimal) -> Option<Decimal> {
    let percent = (sale_price - purchase_price)
        .checked_mul(Decimal::ONE_HUNDRED)?
        .checked_div(purchase_price)?;
    Some(round_half_up(percent, 2))
}

fn validate_info(info: ProductInfo) -> DomainResult<(ProductInfo, Decimal)> {
    let info = ProductInfo {
        name: require_not_blank(&info.name, "product name cannot be empty")?,
        weight: require_positive(info.weight, "weight")?,
        purchase_price: require_positive(info.purchase_price, "purchase price")?,
        sale_price: require_positive(info.sale_price, "sale price")?,
        ..info
    };
    if info.sale_price < info.purchase_price {
        return Err(DomainError::validation(
            "sale price cannot be lower than purchase price",
        ));
    }
    let margin = margin_percent(info.purchase_price, info.sale_price)
        .ok_or_else(|| DomainError::validation("profit margin is too large"))?;
    Ok((info, margin))
}
