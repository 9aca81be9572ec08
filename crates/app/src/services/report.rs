use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use salesdesk_core::money::round2;
use salesdesk_core::Entity;
use salesdesk_sales::TAX_RATE;

use crate::error::AppResult;
use crate::ports::{CustomerRepository, ProductRepository, SaleRepository};
use crate::services::period::{self, Period, checked_add, too_large};

/// Rows in the top revenue products report.
pub const TOP_REVENUE_PRODUCTS: usize = 4;
/// Rows in the oldest products report.
pub const OLDEST_PRODUCTS: usize = 3;

/// One calendar month of item revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenueRow {
    pub year: i32,
    pub month: u32,
    pub month_name: &'static str,
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

/// Twelve months ending with the reference month, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyRevenue {
    pub months: Vec<MonthlyRevenueRow>,
    pub total_revenue: Decimal,
    pub total_tax: Decimal,
    pub grand_total: Decimal,
}

/// Revenue of one product at one unit price, across every sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductRevenue {
    pub product_code: String,
    pub product_name: String,
    pub unit_price: Decimal,
    pub total_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    pub code: String,
    pub full_name: String,
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OldestProduct {
    pub code: String,
    pub name: String,
    pub weight: Decimal,
    pub purchase_price: Decimal,
    pub registered_at: DateTime<Utc>,
}

/// Read-only reports over sales, customers and products.
pub struct ReportService {
    sales: Arc<dyn SaleRepository>,
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
}

impl ReportService {
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

    /// Item revenue per month for the twelve months ending with the month of
    /// `reference`, counting sales up to the end of `reference` itself.
    /// Months without sales read as zero. Each month's subtotal, tax and
    /// total are rounded like a sale's; the grand totals add the rounded
    /// monthly figures.
    pub fn monthly_revenue(&self, reference: NaiveDate) -> AppResult<MonthlyRevenue> {
        let reference_month = period::month_start(reference)?;
        let first_month = period::months_back(reference_month, 11)?;
        let window = Period::days(first_month, reference)?;
        let sales = self.sales.find_created_between(window.from, window.to)?;

        let mut by_month: HashMap<(i32, u32), Decimal> = HashMap::new();
        for sale in &sales {
            let day = sale.created_at().date_naive();
            let sum = by_month.entry((day.year(), day.month())).or_default();
            for item in sale.items() {
                *sum = checked_add(*sum, item.total_price())?;
            }
        }

        let mut months = Vec::with_capacity(12);
        let mut total_revenue = Decimal::ZERO;
        let mut total_tax = Decimal::ZERO;
        for back in (0..12).rev() {
            let month = period::months_back(reference_month, back)?;
            let key = (month.year(), month.month());
            let subtotal = round2(by_month.get(&key).copied().unwrap_or_default());
            let tax_amount = round2(subtotal.checked_mul(TAX_RATE).ok_or_else(too_large)?);
            let total = round2(checked_add(subtotal, tax_amount)?);

            total_revenue = checked_add(total_revenue, subtotal)?;
            total_tax = checked_add(total_tax, tax_amount)?;
            months.push(MonthlyRevenueRow {
                year: key.0,
                month: key.1,
                month_name: period::month_name(month),
                subtotal,
                tax_amount,
                total,
            });
        }

        debug!(reference = %reference, sales = sales.len(), "monthly revenue report");
        Ok(MonthlyRevenue {
            months,
            total_revenue: round2(total_revenue),
            total_tax: round2(total_tax),
            grand_total: round2(checked_add(total_revenue, total_tax)?),
        })
    }

    /// Sale lines grouped by product code, name and unit price, highest
    /// revenue first. Ties go to the lower product code.
    pub fn top_revenue_products(&self, limit: usize) -> AppResult<Vec<ProductRevenue>> {
        let mut groups: HashMap<(String, String, Decimal), Decimal> = HashMap::new();
        for sale in self.sales.find_all()? {
            for item in sale.items() {
                let key = (
                    item.product_code().to_string(),
                    item.product_name().to_string(),
                    item.unit_price(),
                );
                let sum = groups.entry(key).or_default();
                *sum = checked_add(*sum, item.total_price())?;
            }
        }

        let mut ranked: Vec<ProductRevenue> = groups
            .into_iter()
            .map(|((product_code, product_name, unit_price), total_revenue)| ProductRevenue {
                product_code,
                product_name,
                unit_price,
                total_revenue,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.total_revenue
                .cmp(&a.total_revenue)
                .then_with(|| a.product_code.cmp(&b.product_code))
                .then_with(|| a.unit_price.cmp(&b.unit_price))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Customers registered during `year`, by code.
    pub fn new_customers(&self, year: i32) -> AppResult<Vec<NewCustomer>> {
        let window = Period::year(year)?;
        let mut customers = self.customers.find_created_between(window.from, window.to)?;
        customers.sort_by(|a, b| a.code().cmp(b.code()));

        debug!(year, count = customers.len(), "new customers report");
        Ok(customers
            .iter()
            .map(|c| NewCustomer {
                code: c.code().to_string(),
                full_name: c.full_name().to_string(),
                birth_date: c.birth_date(),
            })
            .collect())
    }

    /// Earliest registered products; on equal dates the dearer purchase
    /// comes first.
    pub fn oldest_products(&self, limit: usize) -> AppResult<Vec<OldestProduct>> {
        let mut products = self.products.find_all()?;
        products.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| b.purchase_price().cmp(&a.purchase_price()))
                .then_with(|| a.code().cmp(b.code()))
        });

        Ok(products
            .iter()
            .take(limit)
            .map(|p| OldestProduct {
                code: p.code().to_string(),
                name: p.name().to_string(),
                weight: p.weight(),
                purchase_price: p.purchase_price(),
                registered_at: p.created_at(),
            })
            .collect())
    }
}
