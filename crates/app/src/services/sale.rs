use std::sync::Arc;

use tracing::{debug, info, warn};

use salesdesk_core::{Entity, EntityId};
use salesdesk_sales::{Sale, SaleItem, UpdateSale};

use crate::error::{AppError, AppResult};
use crate::ports::{CustomerRepository, ProductRepository, SaleRepository};

pub struct SaleService {
    sales: Arc<dyn SaleRepository>,
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
}

impl SaleService {
    pub fn new(
        sales: Arc<dyn SaleRepository>,
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
    ) -> Self {
        Self {
            sales,
            customers,
            products,
        }
    }

    /// Checks, in order: the code is unused, the customer exists, the sale
    /// itself is complete, every item refers to a known product.
    pub fn create(&self, sale: Sale) -> AppResult<Sale> {
        if self.sales.exists_by_code(sale.code())? {
            warn!(code = %sale.code(), "duplicate sale code");
            return Err(AppError::conflict(format!("sale {} already exists", sale.code())));
        }
        if self.customers.find_by_code(&sale.customer().code)?.is_none() {
            return Err(AppError::not_found("customer", &sale.customer().code));
        }
        sale.validate_sale()?;
        self.require_known_products(sale.items())?;

        let saved = self.sales.save(sale)?;
        info!(
            id = ?saved.id(),
            code = %saved.code(),
            customer = %saved.customer().code,
            total = %saved.total_amount(),
            "sale created"
        );
        Ok(saved)
    }

    /// Replaces seller, payment and items. Unknown products are rejected
    /// before the sale is touched.
    pub fn update(&self, id: EntityId, cmd: UpdateSale) -> AppResult<Sale> {
        let mut sale = self.find(id)?;
        self.require_known_products(&cmd.items)?;
        sale.update(cmd)?;

        let saved = self.sales.save(sale)?;
        info!(id = %id, code = %saved.code(), total = %saved.total_amount(), "sale updated");
        Ok(saved)
    }

    pub fn find(&self, id: EntityId) -> AppResult<Sale> {
        self.sales
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("sale", id))
    }

    pub fn find_by_code(&self, code: &str) -> AppResult<Sale> {
        self.sales
            .find_by_code(code)?
            .ok_or_else(|| AppError::not_found("sale", code))
    }

    pub fn delete(&self, id: EntityId) -> AppResult<()> {
        let sale = self.find(id).inspect_err(|_| {
            warn!(id = %id, "delete of unknown sale");
        })?;
        debug!(
            code = %sale.code(),
            customer = %sale.customer().code,
            total = %sale.total_amount(),
            "deleting sale"
        );
        self.sales.delete(id)?;
        info!(id = %id, code = %sale.code(), "sale deleted");
        Ok(())
    }

    fn require_known_products(&self, items: &[SaleItem]) -> AppResult<()> {
        for item in items {
            if !self.products.exists_by_code(item.product_code())? {
                return Err(AppError::not_found("product", item.product_code()));
            }
        }
        Ok(())
    }
}
