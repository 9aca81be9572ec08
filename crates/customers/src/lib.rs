//! Customers domain module.
//!
//! Identity documents, postal addresses and the `Customer` aggregate. Pure
//! validation logic: no IO, no storage, no clock beyond `Utc::now()` in the
//! convenience constructors.

pub mod address;
pub mod customer;
pub mod document;

pub use address::{Address, AddressFields};
pub use customer::{Customer, CustomerDetails};
pub use document::{Document, cpf_checksum_valid};
