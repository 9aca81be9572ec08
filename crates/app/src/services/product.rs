use std::sync::Arc;

use tracing::{info, warn};

use salesdesk_core::text::is_blank;
use salesdesk_core::{Entity, EntityId};
use salesdesk_products::{CreateProduct, Product, ProductInfo};

use crate::error::{AppError, AppResult};
use crate::ports::{CodeGenerator, ProductRepository};

pub struct ProductService {
    products: Arc<dyn ProductRepository>,
    codes: Arc<dyn CodeGenerator>,
}

impl ProductService {
    pub fn new(products: Arc<dyn ProductRepository>, codes: Arc<dyn CodeGenerator>) -> Self {
        Self { products, codes }
    }

    /// Uses `code` when given (it must be unused), otherwise the next
    /// generated product code.
    pub fn create(&self, code: Option<&str>, cmd: &CreateProduct) -> AppResult<Product> {
        let code = match code {
            Some(code) if !is_blank(Some(code)) => {
                let code = code.trim();
                if self.products.exists_by_code(code)? {
                    warn!(code, "duplicate product code");
                    return Err(AppError::conflict(format!("product code {code} already exists")));
                }
                code.to_string()
            }
            _ => self.codes.next_product_code()?,
        };

        let saved = self.products.save(Product::create(code, cmd)?)?;
        info!(
            id = ?saved.id(),
            code = %saved.code(),
            stock = saved.stock_quantity(),
            "product created"
        );
        Ok(saved)
    }

    pub fn update_info(&self, id: EntityId, info: ProductInfo) -> AppResult<Product> {
        let mut product = self.find(id)?;
        product.update_info(info)?;
        let saved = self.products.save(product)?;
        info!(id = %id, code = %saved.code(), "product updated");
        Ok(saved)
    }

    pub fn add_stock(&self, id: EntityId, quantity: i64) -> AppResult<Product> {
        let mut product = self.find(id)?;
        product.add_stock(quantity)?;
        let saved = self.products.save(product)?;
        info!(id = %id, quantity, stock = saved.stock_quantity(), "stock added");
        Ok(saved)
    }

    pub fn remove_stock(&self, id: EntityId, quantity: i64) -> AppResult<Product> {
        let mut product = self.find(id)?;
        product.remove_stock(quantity)?;
        let saved = self.products.save(product)?;
        info!(id = %id, quantity, stock = saved.stock_quantity(), "stock removed");
        Ok(saved)
    }

    pub fn find(&self, id: EntityId) -> AppResult<Product> {
        self.products
            .find_by_id(id)?
            .ok_or_else(|| AppError::not_found("product", id))
    }

    pub fn find_by_code(&self, code: &str) -> AppResult<Product> {
        self.products
            .find_by_code(code)?
            .ok_or_else(|| AppError::not_found("product", code))
    }

    pub fn delete(&self, id: EntityId) -> AppResult<()> {
        let product = self.find(id)?;
        self.products.delete(id)?;
        info!(id = %id, code = %product.code(), "product deleted");
        Ok(())
    }
}
