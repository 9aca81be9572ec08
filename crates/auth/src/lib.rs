//! `salesdesk-auth`: credential value objects and the `User` aggregate.
//!
//! This crate is intentionally decoupled from HTTP and storage. One-way
//! hashing is reached through the [`PasswordHasher`] port; [`BcryptHasher`]
//! is the production adapter.

pub mod email;
pub mod error;
pub mod password;
pub mod token;
pub mod user;

pub use email::Email;
pub use error::CredentialError;
pub use password::{BcryptHasher, Password, PasswordHasher};
pub use token::Token;
pub use user::User;
