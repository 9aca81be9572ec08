//! Products domain module.
//!
//! This crate contains business rules for the product catalog (categories,
//! physical dimensions, pricing and stock), implemented purely as deterministic
//! domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod dimensions;
pub mod product;

pub use category::ProductCategory;
pub use dimensions::Dimensions;
pub use product::{CreateProduct, Product, ProductInfo};
