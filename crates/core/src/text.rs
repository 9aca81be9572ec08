//! Text normalization and presence checks shared by the value objects.

use crate::error::{DomainError, DomainResult};

/// Returns `value` unchanged when it has non-whitespace content, otherwise a
/// validation error carrying `message`.
pub fn require_not_blank(value: &str, message: &str) -> DomainResult<String> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(message));
    }
    Ok(value.to_string())
}

/// Like [`require_not_blank`] for optional input; `None` is blank.
pub fn require_present(value: Option<&str>, message: &str) -> DomainResult<String> {
    match value {
        Some(v) => require_not_blank(v, message),
        None => Err(DomainError::validation(message)),
    }
}

/// `true` when the value is absent or only whitespace.
pub fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Keeps ASCII digits only (`"123.456.789-09"` → `"12345678909"`).
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Strips everything except ASCII digits and then requires an exact length.
pub fn exact_digits(
    value: &str,
    len: usize,
    blank_message: &str,
    length_message: &str,
) -> DomainResult<String> {
    require_not_blank(value, blank_message)?;
    let digits = digits_only(value);
    if digits.len() != len {
        return Err(DomainError::validation(length_message));
    }
    Ok(digits)
}
