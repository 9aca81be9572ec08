//! Use-case services.
//!
//! Each service owns the cross-aggregate checks for its area and persists
//! through the repository ports. Domain errors pass through unchanged.

pub mod auth;
pub mod customer;
pub mod dashboard;
mod period;
pub mod product;
pub mod report;
pub mod sale;

pub use auth::AuthService;
pub use customer::{CreateCustomer, CustomerService};
pub use dashboard::{ChartPoint, ChartRange, DashboardService, DashboardStats, RecentSale};
pub use product::ProductService;
pub use report::{
    MonthlyRevenue, MonthlyRevenueRow, NewCustomer, OldestProduct, ProductRevenue, ReportService,
};
pub use sale::SaleService;
