//! Runtime configuration, read from the environment.
//!
//! | variable | default | accepted |
//! |---|---|---|
//! | `SALESDESK_BCRYPT_COST` | 12 | 4..=31 |
//! | `SALESDESK_RESET_TOKEN_TTL_MINUTES` | 60 | 1..=10080 |
//! | `SALESDESK_LOG_FORMAT` | `json` | `json`, `pretty` |
//!
//! Unset variables fall back to the default with a warning. Set but invalid
//! values are errors.

use chrono::Duration;
use thiserror::Error;

use salesdesk_auth::BcryptHasher;
use salesdesk_observability::{LogConfig, LogFormat};

pub const BCRYPT_COST_VAR: &str = "SALESDESK_BCRYPT_COST";
pub const RESET_TOKEN_TTL_VAR: &str = "SALESDESK_RESET_TOKEN_TTL_MINUTES";
pub const LOG_FORMAT_VAR: &str = "SALESDESK_LOG_FORMAT";

const DEFAULT_BCRYPT_COST: i64 = 12;
const DEFAULT_RESET_TOKEN_TTL_MINUTES: i64 = 60;
const MAX_RESET_TOKEN_TTL_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var} must be an integer, got `{value}`")]
    NotAnInteger { var: &'static str, value: String },

    #[error("{var} must be between {min} and {max}, got {value}")]
    OutOfRange {
        var: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub bcrypt_cost: u32,
    pub reset_token_ttl: Duration,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: DEFAULT_BCRYPT_COST as u32,
            reset_token_ttl: Duration::minutes(DEFAULT_RESET_TOKEN_TTL_MINUTES),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same rules as [`AppConfig::from_env`] over an arbitrary source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bcrypt_cost = integer_in_range(
            &lookup,
            BCRYPT_COST_VAR,
            DEFAULT_BCRYPT_COST,
            4,
            31,
        )?;
        let ttl_minutes = integer_in_range(
            &lookup,
            RESET_TOKEN_TTL_VAR,
            DEFAULT_RESET_TOKEN_TTL_MINUTES,
            1,
            MAX_RESET_TOKEN_TTL_MINUTES,
        )?;

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(raw) => raw.parse::<LogFormat>().map_err(|e| ConfigError::Invalid {
                var: LOG_FORMAT_VAR,
                message: e.to_string(),
            })?,
            None => {
                tracing::warn!(var = LOG_FORMAT_VAR, "not set; using json");
                LogFormat::default()
            }
        };

        Ok(Self {
            bcrypt_cost: bcrypt_cost as u32,
            reset_token_ttl: Duration::minutes(ttl_minutes),
            log_format,
        })
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            format: self.log_format,
            ..LogConfig::default()
        }
    }

    pub fn password_hasher(&self) -> Result<BcryptHasher, ConfigError> {
        BcryptHasher::new(self.bcrypt_cost).map_err(|e| ConfigError::Invalid {
            var: BCRYPT_COST_VAR,
            message: e.to_string(),
        })
    }
}

fn integer_in_range(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: i64,
    min: i64,
    max: i64,
) -> Result<i64, ConfigError> {
    let Some(raw) = lookup(var) else {
        tracing::warn!(var, default, "not set; using default");
        return Ok(default);
    };

    let value: i64 = raw.trim().parse().map_err(|_| ConfigError::NotAnInteger {
        var,
        value: raw.clone(),
    })?;
    if !(min..=max).contains(&value) {
        return Err(ConfigError::OutOfRange { var, value, min, max });
    }
    Ok(value)
}
