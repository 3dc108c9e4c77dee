//! Caller-side validation.
//!
//! Validation runs before any backend call, so a rejected input never leaves
//! partial state behind.

use thiserror::Error;

/// Input rejected before reaching the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required form field is empty or whitespace.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// The order field does not hold an integer.
    #[error("order must be a whole number, got {0:?}")]
    InvalidOrder(String),
}

/// Parse the free-text order field of the dashboard.
///
/// Surrounding whitespace is ignored. Anything that is not a base-10 integer
/// (including an empty field) is rejected.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidOrder`] when the input is not an integer.
pub fn parse_order_input(input: &str) -> Result<i64, ValidationError> {
    input
        .trim()
        .parse::<i64>()
        .map_err(|_| ValidationError::InvalidOrder(input.to_owned()))
}

/// Return the trimmed field, or reject it when nothing is left.
pub(crate) fn require(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed.to_owned())
    }
}
