//! Application layer: orchestration over the domain crates.
//!
//! Services enforce the rules that span aggregates (uniqueness, referential
//! checks, notification side effects), build the report and dashboard
//! figures, and talk to storage and delivery only through the traits in
//! [`ports`]. The [`memory`] module provides in-process adapters for tests
//! and local runs.

pub mod config;
pub mod error;
pub mod memory;
pub mod ports;
pub mod services;

pub use config::{AppConfig, ConfigError};
pub use error::{AppError, AppResult};
pub use services::{
    AuthService, ChartRange, CreateCustomer, CustomerService, DashboardService, ProductService,
    ReportService, SaleService,
};
