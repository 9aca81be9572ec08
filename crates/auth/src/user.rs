//! User aggregate: login credentials bound to a customer.
//!
//! The user's business code is the customer code it was registered for.

use chrono::{DateTime, Utc};
use serde::Serialize;

use salesdesk_core::text::require_not_blank;
use salesdesk_core::{DomainError, DomainResult, Entity, EntityMeta};

use crate::email::Email;
use crate::password::{Password, PasswordHasher};
use crate::token::Token;

// ─────────────────────────────────────────────────────────────────────────────
// User Aggregate
// ─────────────────────────────────────────────────────────────────────────────

/// User aggregate for authentication.
///
/// # Invariants
/// - The code (customer code) is never blank.
/// - Inactive users cannot authenticate.
/// - Changing the password discards any pending reset token.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    meta: EntityMeta,
    email: Email,
    password: Password,
    active: bool,
    reset_token: Option<Token>,
}

impl User {
    /// New, active user with no pending reset.
    pub fn new(customer_code: &str, email: Email, password: Password) -> DomainResult<Self> {
        let code = validate_customer_code(customer_code)?;
        Ok(Self {
            meta: EntityMeta::new(code),
            email,
            password,
            active: true,
            reset_token: None,
        })
    }

    pub fn restore(
        meta: EntityMeta,
        email: Email,
        password: Password,
        active: bool,
        reset_token: Option<Token>,
    ) -> DomainResult<Self> {
        validate_customer_code(meta.code())?;
        Ok(Self {
            meta,
            email,
            password,
            active,
            reset_token,
        })
    }

    pub fn customer_code(&self) -> &str {
        self.meta.code()
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn password(&self) -> &Password {
        &self.password
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn reset_token(&self) -> Option<&Token> {
        self.reset_token.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Credential Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Fails with `InvalidState` for an inactive user; otherwise reports
    /// whether `plain` matches the stored password.
    pub fn authenticate(&self, plain: &str, hasher: &dyn PasswordHasher) -> DomainResult<bool> {
        if !self.active {
            return Err(DomainError::invalid_state("user is inactive"));
        }
        Ok(self.password.matches(plain, hasher))
    }

    pub fn change_password(&mut self, new_password: Password) {
        self.password = new_password;
        self.reset_token = None;
    }

    /// Issues (or replaces) the pending reset token.
    pub fn generate_reset_password_token(
        &mut self,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> DomainResult<()> {
        self.reset_token = Some(Token::new(token, expires_at)?);
        Ok(())
    }

    /// `None` clears the pending token.
    pub fn set_reset_token(&mut self, token: Option<Token>) {
        self.reset_token = token;
    }

    pub fn is_reset_token_valid(&self, candidate: &str) -> bool {
        self.is_reset_token_valid_at(candidate, Utc::now())
    }

    /// `false` when nothing is pending or the token expired before `now`;
    /// otherwise exact comparison with `candidate`.
    pub fn is_reset_token_valid_at(&self, candidate: &str, now: DateTime<Utc>) -> bool {
        match &self.reset_token {
            Some(token) if token.is_valid_at(now) => token.value() == candidate,
            _ => false,
        }
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

impl Entity for User {
    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut EntityMeta {
        &mut self.meta
    }
}

fn validate_customer_code(code: &str) -> DomainResult<String> {
    require_not_blank(code, "customer code cannot be empty")
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
