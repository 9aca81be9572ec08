//! Sales domain module.
//!
//! This crate contains business rules for point-of-sale transactions: payment
//! methods, line items, tax and change computation. Pure domain logic (no IO,
//! no HTTP, no storage).

pub mod item;
pub mod payment;
pub mod sale;

pub use item::SaleItem;
pub use payment::PaymentMethod;
pub use sale::{Participant, Payment, Sale, TAX_RATE, UpdateSale};
