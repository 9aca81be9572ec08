//! `salesdesk-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the error model, the entity base shared by every aggregate, and the small
//! text/decimal helpers the value objects are built from.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod text;
pub mod value_object;

pub use entity::{Entity, EntityMeta};
pub use error::{DomainError, DomainResult};
pub use id::EntityId;
pub use value_object::ValueObject;

pub use rust_decimal::Decimal;
