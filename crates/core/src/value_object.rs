//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity** - they are defined entirely by their
//! attribute values and are validated once, at construction.

/// Marker trait for value objects.
///
/// ## Value Object vs Entity
///
/// - **Value Object**: no identity; compared by (some or all of) its values.
///   `Address`, `Document`, `Dimensions`, `Email`, `Password`, `Token`.
/// - **Entity**: has a business code; compared by that code only.
///   `Customer`, `Product`, `Sale`, `User`.
///
/// ## Construction
///
/// Implementors keep their fields private and expose a fallible constructor,
/// so an invalid instance cannot exist. There are no setters; to "change" a
/// value object, build a new one.
///
/// Some value objects define equality over a subset of their fields (an
/// `Address` compares postal code, street and number only). That is part of
/// the type's contract and is documented on the type.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
