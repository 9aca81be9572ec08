use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use salesdesk_core::money::round_half_up;
use salesdesk_core::{Entity, EntityId};
use salesdesk_sales::Sale;

use crate::error::AppResult;
use crate::ports::{CustomerRepository, ProductRepository, SaleRepository};
use crate::services::period::{self, Period, revenue, too_large};

/// Default size of the recent sales list.
pub const RECENT_SALES: usize = 5;

/// Month buckets in [`ChartRange::Month`]; the last one runs to today.
const WEEKS_PER_MONTH: u32 = 4;

/// Totals since the beginning plus this month against last month.
///
/// Variations are percentages with one decimal place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub total_sales: usize,
    pub total_revenue: Decimal,
    pub total_customers: usize,
    pub total_products: usize,
    pub sales_variation: Decimal,
    pub revenue_variation: Decimal,
    pub customers_variation: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentSale {
    pub id: Option<EntityId>,
    pub code: String,
    pub customer_name: String,
    /// First line's product, with `(+N itens)` when there are more lines.
    pub product_name: String,
    pub total_amount: Decimal,
    pub sale_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartRange {
    /// The last seven days, one point per day.
    Week,
    /// The current month in weekly buckets.
    #[default]
    Month,
    /// The last three months.
    Quarter,
    /// The last twelve months.
    Year,
}

impl ChartRange {
    /// Lenient query-parameter parsing; anything unknown is a month.
    pub fn from_param(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "week" => Self::Week,
            "quarter" => Self::Quarter,
            "year" => Self::Year,
            _ => Self::Month,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub short_label: String,
    /// First day of the bucket.
    pub date: NaiveDate,
    pub sales_count: usize,
    pub revenue: Decimal,
}

/// Home-screen figures: headline stats, recent sales and the sales chart.
pub struct DashboardService {
    sales: Arc<dyn SaleRepository>,
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
}

impl DashboardService {
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

    pub fn stats(&self) -> AppResult<DashboardStats> {
        self.stats_at(Utc::now().date_naive())
    }

    /// This month runs from its first day through `today`; last month is the
    /// whole previous calendar month.
    pub fn stats_at(&self, today: NaiveDate) -> AppResult<DashboardStats> {
        let this_month = period::month_start(today)?;
        let current = Period::days(this_month, today)?;
        let previous = Period::month(period::months_back(this_month, 1)?)?;

        let current_sales = self.sales.find_created_between(current.from, current.to)?;
        let previous_sales = self.sales.find_created_between(previous.from, previous.to)?;
        let current_customers = self.customers.find_created_between(current.from, current.to)?;
        let previous_customers = self.customers.find_created_between(previous.from, previous.to)?;

        let all_sales = self.sales.find_all()?;
        let stats = DashboardStats {
            total_sales: all_sales.len(),
            total_revenue: revenue(&all_sales)?,
            total_customers: self.customers.find_all()?.len(),
            total_products: self.products.find_all()?.len(),
            sales_variation: variation(
                Decimal::from(current_sales.len()),
                Decimal::from(previous_sales.len()),
            )?,
            revenue_variation: variation(revenue(&current_sales)?, revenue(&previous_sales)?)?,
            customers_variation: variation(
                Decimal::from(current_customers.len()),
                Decimal::from(previous_customers.len()),
            )?,
        };
        debug!(today = %today, total_sales = stats.total_sales, "dashboard stats");
        Ok(stats)
    }

    /// Latest sales first.
    pub fn recent_sales(&self, limit: usize) -> AppResult<Vec<RecentSale>> {
        let mut sales = self.sales.find_all()?;
        sales.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(sales.iter().take(limit).map(recent_sale).collect())
    }

    pub fn chart_data(&self, range: ChartRange) -> AppResult<Vec<ChartPoint>> {
        self.chart_data_at(range, Utc::now().date_naive())
    }

    /// Sales count and revenue per bucket, oldest bucket first.
    pub fn chart_data_at(&self, range: ChartRange, today: NaiveDate) -> AppResult<Vec<ChartPoint>> {
        let mut points = Vec::new();
        match range {
            ChartRange::Week => {
                for back in (0..7).rev() {
                    let day = period::days_back(today, back)?;
                    let name = period::day_name(day);
                    points.push(self.point(name, name, day, Period::days(day, day)?)?);
                }
            }
            ChartRange::Month => {
                let mut week_start = period::month_start(today)?;
                for week in 1..=WEEKS_PER_MONTH {
                    if week_start > today {
                        break;
                    }
                    let week_end = if week == WEEKS_PER_MONTH {
                        today
                    } else {
                        period::days_ahead(week_start, 6)?.min(today)
                    };
                    let label = format!("Semana {week}");
                    points.push(self.point(&label, &label, week_start, Period::days(week_start, week_end)?)?);
                    week_start = period::days_ahead(week_start, 7)?;
                }
            }
            ChartRange::Quarter => self.monthly_points(today, 3, &mut points)?,
            ChartRange::Year => self.monthly_points(today, 12, &mut points)?,
        }
        Ok(points)
    }

    fn monthly_points(&self, today: NaiveDate, months: u32, points: &mut Vec<ChartPoint>) -> AppResult<()> {
        let this_month = period::month_start(today)?;
        for back in (0..months).rev() {
            let month = period::months_back(this_month, back)?;
            points.push(self.point(
                period::month_name(month),
                period::short_month_name(month),
                month,
                Period::month(month)?,
            )?);
        }
        Ok(())
    }

    fn point(&self, label: &str, short_label: &str, date: NaiveDate, window: Period) -> AppResult<ChartPoint> {
        let sales = self.sales.find_created_between(window.from, window.to)?;
        Ok(ChartPoint {
            label: label.to_string(),
            short_label: short_label.to_string(),
            date,
            sales_count: sales.len(),
            revenue: revenue(&sales)?,
        })
    }
}

fn recent_sale(sale: &Sale) -> RecentSale {
    let mut product_name = sale
        .items()
        .first()
        .map_or_else(|| "N/A".to_string(), |item| item.product_name().to_string());
    if sale.items().len() > 1 {
        product_name.push_str(&format!(" (+{} itens)", sale.items().len() - 1));
    }
    RecentSale {
        id: sale.id(),
        code: sale.code().to_string(),
        customer_name: sale.customer().name.clone(),
        product_name,
        total_amount: sale.total_amount(),
        sale_date: sale.created_at(),
    }
}

/// `(current - previous) × 100 / previous`, half-up to one place. From
/// nothing, any growth is 100% and no growth is 0%.
fn variation(current: Decimal, previous: Decimal) -> AppResult<Decimal> {
    if previous.is_zero() {
        let flat = if current > Decimal::ZERO {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        return Ok(round_half_up(flat, 1));
    }
    let percent = (current - previous)
        .checked_mul(Decimal::ONE_HUNDRED)
        .and_then(|scaled| scaled.checked_div(previous))
        .ok_or_else(too_large)?;
    Ok(round_half_up(percent, 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn variation_from_zero_is_flat() {
        assert_eq!(variation(dec("3"), Decimal::ZERO).unwrap().to_string(), "100.0");
        assert_eq!(variation(Decimal::ZERO, Decimal::ZERO).unwrap().to_string(), "0.0");
    }

    #[test]
    fn variation_is_rounded_once() {
        assert_eq!(variation(dec("3"), dec("2")).unwrap().to_string(), "50.0");
        assert_eq!(variation(dec("1"), dec("3")).unwrap().to_string(), "-66.7");
        assert_eq!(variation(dec("2"), dec("3")).unwrap().to_string(), "-33.3");
        assert!(variation(Decimal::MAX, dec("1")).is_err());
    }

    #[test]
    fn chart_range_defaults_to_month() {
        assert_eq!(ChartRange::from_param("WEEK"), ChartRange::Week);
        assert_eq!(ChartRange::from_param(" quarter "), ChartRange::Quarter);
        assert_eq!(ChartRange::from_param("year"), ChartRange::Year);
        assert_eq!(ChartRange::from_param("decade"), ChartRange::Month);
        assert_eq!(ChartRange::default(), ChartRange::Month);
    }
}
