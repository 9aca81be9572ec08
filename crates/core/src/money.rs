//! Fixed-point helpers for monetary and measured amounts.
//!
//! All arithmetic is done in [`Decimal`]; rounding is half-up (away from zero
//! at the midpoint) and results carry the exact requested scale, so `75.5`
//! rounded to two places is `75.50`.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::{DomainError, DomainResult};

/// Rounds half-up to `dp` decimal places and fixes the scale at `dp`.
pub fn round_half_up(value: Decimal, dp: u32) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(dp);
    rounded
}

/// Half-up rounding to cents.
pub fn round2(value: Decimal) -> Decimal {
    round_half_up(value, 2)
}

/// Requires a strictly positive amount (`"<field> must be greater than zero"`).
pub fn require_positive(value: Decimal, field: &str) -> DomainResult<Decimal> {
    if value <= Decimal::ZERO {
        return Err(DomainError::validation(format!(
            "{field} must be greater than zero"
        )));
    }
    Ok(value)
}

/// Rejects negative amounts; absent stays absent.
pub fn require_non_negative(value: Option<Decimal>, field: &str) -> DomainResult<Option<Decimal>> {
    match value {
        Some(v) if v < Decimal::ZERO => Err(DomainError::validation(format!(
            "{field} cannot be negative"
        ))),
        other => Ok(other),
    }
}
