use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use salesdesk_auth::{Email, Password, PasswordHasher, User};
use salesdesk_core::{DomainError, Entity};

use crate::config::AppConfig;
use crate::error::{AppError, AppResult};
use crate::ports::{CustomerRepository, Notifier, TokenBlacklist, TokenIssuer, UserRepository};

const INVALID_RESET_TOKEN: &str = "invalid or expired reset token";
const BEARER_SCHEME: &str = "bearer";

/// Registration, login, logout and the password reset flow.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    customers: Arc<dyn CustomerRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenIssuer>,
    notifier: Arc<dyn Notifier>,
    blacklist: Arc<dyn TokenBlacklist>,
    reset_token_ttl: Duration,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        customers: Arc<dyn CustomerRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenIssuer>,
        notifier: Arc<dyn Notifier>,
        blacklist: Arc<dyn TokenBlacklist>,
        config: &AppConfig,
    ) -> Self {
        Self {
            users,
            customers,
            hasher,
            tokens,
            notifier,
            blacklist,
            reset_token_ttl: config.reset_token_ttl,
        }
    }

    /// Creates the login for an existing customer. One user per customer and
    /// per e-mail. The welcome e-mail is best-effort.
    pub fn register(&self, customer_code: &str, email: &str, plain_password: &str) -> AppResult<User> {
        info!(customer_code, email, "registering user");

        let customer = self.customers.find_by_code(customer_code)?.ok_or_else(|| {
            warn!(customer_code, "registration for unknown customer");
            AppError::not_found("customer", customer_code)
        })?;

        let email = Email::new(email)?;
        let password = Password::from_plain_text(plain_password, self.hasher.as_ref())?;

        if self.users.exists_by_email(&email)? {
            warn!(email = %email, "duplicate user email");
            return Err(AppError::conflict(format!("email {email} is already in use")));
        }
        if self.users.exists_by_customer_code(customer_code)? {
            warn!(customer_code, "customer already has a user");
            return Err(AppError::conflict(format!(
                "customer {customer_code} already has a user"
            )));
        }

        let saved = self.users.save(User::new(customer_code, email, password)?)?;
        info!(id = ?saved.id(), customer_code = %saved.customer_code(), "user registered");

        match self.notifier.send_welcome(saved.email(), customer.full_name()) {
            Ok(()) => info!(email = %saved.email(), "welcome email sent"),
            Err(e) => warn!(email = %saved.email(), error = %e, "welcome email failed"),
        }
        Ok(saved)
    }

    /// Returns an access token. Unknown e-mail and wrong password fail the
    /// same way; an inactive user is a state error.
    pub fn login(&self, email: &str, plain_password: &str) -> AppResult<String> {
        let email = Email::new(email)?;
        let user = self
            .users
            .find_by_email(&email)?
            .ok_or(AppError::InvalidCredentials)?;

        if !user.authenticate(plain_password, self.hasher.as_ref())? {
            warn!(email = %email, "login rejected");
            return Err(AppError::InvalidCredentials);
        }

        info!(id = ?user.id(), "login succeeded");
        Ok(self.tokens.access_token(&user))
    }

    /// Revokes an access token. Accepts the raw token or an
    /// `Authorization` header value (`Bearer <token>`, any case).
    pub fn logout(&self, token: &str) -> AppResult<()> {
        let token = bare_token(token)?;
        self.blacklist.revoke(token)?;
        info!("access token revoked");
        Ok(())
    }

    pub fn is_token_revoked(&self, token: &str) -> AppResult<bool> {
        Ok(self.blacklist.is_revoked(bare_token(token)?)?)
    }

    pub fn forgot_password(&self, email: &str) -> AppResult<()> {
        self.forgot_password_at(email, Utc::now())
    }

    /// Stores a fresh reset token valid for the configured TTL, then sends
    /// it. A delivery failure is logged and does not undo the stored token.
    pub fn forgot_password_at(&self, email: &str, now: DateTime<Utc>) -> AppResult<()> {
        let email = Email::new(email)?;
        let mut user = self
            .users
            .find_by_email(&email)?
            .ok_or_else(|| AppError::not_found("user", &email))?;

        let token = self.tokens.reset_token();
        user.generate_reset_password_token(&token, now + self.reset_token_ttl)?;
        let saved = self.users.save(user)?;
        info!(id = ?saved.id(), "reset token issued");

        if let Some(token) = saved.reset_token() {
            if let Err(e) = self.notifier.send_reset_password(saved.email(), token) {
                warn!(email = %saved.email(), error = %e, "reset password email failed");
            }
        }
        Ok(())
    }

    pub fn reset_password(&self, token: &str, new_plain_password: &str) -> AppResult<()> {
        self.reset_password_at(token, new_plain_password, Utc::now())
    }

    /// Unknown and expired tokens are reported identically.
    pub fn reset_password_at(
        &self,
        token: &str,
        new_plain_password: &str,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let mut user = self
            .users
            .find_by_reset_token(token)?
            .ok_or_else(|| DomainError::validation(INVALID_RESET_TOKEN))?;

        if !user.is_reset_token_valid_at(token, now) {
            warn!(id = ?user.id(), "expired reset token presented");
            return Err(DomainError::validation(INVALID_RESET_TOKEN).into());
        }

        user.change_password(Password::from_plain_text(new_plain_password, self.hasher.as_ref())?);
        let saved = self.users.save(user)?;
        info!(id = ?saved.id(), "password reset");
        Ok(())
    }
}

/// Strips an optional `Bearer` scheme; a bare scheme counts as no token.
fn bare_token(raw: &str) -> AppResult<&str> {
    let raw = raw.trim();
    let token = match raw.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(BEARER_SCHEME) => rest.trim(),
        None if raw.eq_ignore_ascii_case(BEARER_SCHEME) => "",
        _ => raw,
    };
    if token.is_empty() {
        return Err(DomainError::validation("token cannot be empty").into());
    }
    Ok(token)
}
