#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use salesdesk_app::memory::{
    InMemoryCustomerRepository, InMemoryProductRepository, InMemorySaleRepository,
    InMemoryTokenBlacklist, InMemoryUserRepository, LoggingNotifier, SequentialCodeGenerator,
    UuidTokenIssuer,
};
use salesdesk_app::{
    AppConfig, AuthService, CreateCustomer, CustomerService, DashboardService, ProductService,
    ReportService, SaleService,
};
use salesdesk_customers::{Address, AddressFields, CustomerDetails};
use salesdesk_products::CreateProduct;

pub const CPF_A: &str = "123.456.789-09";
pub const CPF_B: &str = "529.982.247-25";
pub const PASSWORD: &str = "Secret#123";

/// Every service wired to fresh in-memory adapters.
pub struct Harness {
    pub users: Arc<InMemoryUserRepository>,
    pub customer_repo: Arc<InMemoryCustomerRepository>,
    pub product_repo: Arc<InMemoryProductRepository>,
    pub sale_repo: Arc<InMemorySaleRepository>,
    pub notifier: Arc<LoggingNotifier>,
    pub customers: CustomerService,
    pub products: ProductService,
    pub sales: SaleService,
    pub auth: AuthService,
    pub reports: ReportService,
    pub dashboard: DashboardService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_notifier(LoggingNotifier::new())
    }

    pub fn with_notifier(notifier: LoggingNotifier) -> Self {
        let config = AppConfig {
            bcrypt_cost: 4,
            ..AppConfig::default()
        };
        salesdesk_observability::init_with(&config.log_config());

        let customer_repo = Arc::new(InMemoryCustomerRepository::new());
        let product_repo = Arc::new(InMemoryProductRepository::new());
        let sale_repo = Arc::new(InMemorySaleRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let codes = Arc::new(SequentialCodeGenerator::new());
        let notifier = Arc::new(notifier);
        let hasher = Arc::new(config.password_hasher().expect("cost 4 is valid"));

        Self {
            customers: CustomerService::new(customer_repo.clone(), codes.clone()),
            products: ProductService::new(product_repo.clone(), codes),
            sales: SaleService::new(sale_repo.clone(), customer_repo.clone(), product_repo.clone()),
            auth: AuthService::new(
                users.clone(),
                customer_repo.clone(),
                hasher,
                Arc::new(UuidTokenIssuer),
                notifier.clone(),
                Arc::new(InMemoryTokenBlacklist::new()),
                &config,
            ),
            reports: ReportService::new(sale_repo.clone(), customer_repo.clone(), product_repo.clone()),
            dashboard: DashboardService::new(sale_repo.clone(), customer_repo.clone(), product_repo.clone()),
            users,
            customer_repo,
            product_repo,
            sale_repo,
            notifier,
        }
    }
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn details(email: &str) -> CustomerDetails {
    CustomerDetails {
        full_name: "Maria Souza".into(),
        mother_name: "Ana Souza".into(),
        address: Address::new(AddressFields {
            zip_code: "01310-100".into(),
            street: "Avenida Paulista".into(),
            number: "1000".into(),
            complement: Some("Apto 12".into()),
            neighborhood: "Bela Vista".into(),
            city: "São Paulo".into(),
            state: "sp".into(),
        })
        .unwrap(),
        birth_date: NaiveDate::from_ymd_opt(1990, 5, 20).unwrap(),
        cell_phone: "(11) 98765-4321".into(),
        email: email.into(),
    }
}

pub fn new_customer(cpf: &str, email: &str) -> CreateCustomer {
    CreateCustomer {
        cpf: cpf.into(),
        rg: "12.345.678-9".into(),
        details: details(email),
    }
}

pub fn new_product(name: &str, initial_stock: i64) -> CreateProduct {
    CreateProduct {
        name: name.into(),
        category: "NAILS".into(),
        details: None,
        weight: dec("0.15"),
        purchase_price: dec("10.00"),
        sale_price: dec("30.00"),
        height: dec("10"),
        width: dec("5"),
        depth: dec("2"),
        destination: None,
        initial_stock,
    }
}
