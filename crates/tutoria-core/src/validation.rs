//! Precondition guards shared by every marketplace component.
//!
//! Each guard is pure: it either hands the checked value back or fails with
//! the caller's message. Callers run all guards before touching any state.

use std::fmt::Display;

use crate::error::{Error, Result};

/// Fail with `InvalidArgument` when `text` is empty or whitespace-only.
pub fn require_non_blank<'a>(text: &'a str, message: &str) -> Result<&'a str> {
    if text.trim().is_empty() {
        return Err(Error::invalid_argument(message));
    }
    Ok(text)
}

/// Fail with `InvalidArgument` when `value` lies outside `[low, high]`.
pub fn require_in_range<T>(value: T, low: T, high: T, message: &str) -> Result<T>
where
    T: PartialOrd + Display + Copy,
{
    // NaN compares false on both sides and must be rejected too.
    if !(value >= low && value <= high) {
        return Err(Error::invalid_argument(format!(
            "{message} (got {value}, expected {low}..={high})"
        )));
    }
    Ok(value)
}

/// Fail with `InvalidArgument` unless `value > 0`.
pub fn require_positive(value: i64, message: &str) -> Result<i64> {
    if value <= 0 {
        return Err(Error::invalid_argument(message));
    }
    Ok(value)
}

/// Fail with `InvalidArgument` when `value < 0`.
pub fn require_non_negative(value: i64, message: &str) -> Result<i64> {
    if value < 0 {
        return Err(Error::invalid_argument(message));
    }
    Ok(value)
}

/// Fail with `NullReference` when a required handle is absent.
pub fn require_present<T>(value: Option<T>, message: &str) -> Result<T> {
    value.ok_or_else(|| Error::null_reference(message))
}

/// Fail with `InvalidArgument` for blank or malformed e-mail addresses.
///
/// Accepts `local@domain.tld` where the local part uses letters, digits and
/// `_ - + .`, the domain uses letters, digits, `-` and dots, and the final
/// label is at least two letters.
pub fn require_email<'a>(email: &'a str, message: &str) -> Result<&'a str> {
    require_non_blank(email, message)?;
    if !is_well_formed_email(email) {
        return Err(Error::invalid_argument(message));
    }
    Ok(email)
}

fn is_well_formed_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && !local.starts_with('.')
        && !local.ends_with('.')
        && !local.contains("..")
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '+' | '.'));
    if !local_ok {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 {
        return false;
    }
    let labels_ok = labels.iter().all(|label| {
        !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    });
    let tld = labels[labels.len() - 1];
    labels_ok && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
}
