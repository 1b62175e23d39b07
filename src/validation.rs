//! Presence checks for request fields.
//!
//! Request bodies are deserialized into structs of `Option`s and then checked
//! here before any of their values reach the database functions. A field
//! counts as missing if it is absent, `null`, an empty string, or a zero
//! amount.

use crate::Error;

/// Return the text in `field`, or [Error::MissingFields] if it is absent or empty.
pub(crate) fn required_text(field: Option<String>) -> Result<String, Error> {
    match field {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(Error::MissingFields),
    }
}

/// Return the amount in `field`, or [Error::MissingFields] if it is absent or zero.
///
/// A zero amount does not record any movement of money, so it is treated the
/// same as a missing amount.
pub(crate) fn required_amount(field: Option<f64>) -> Result<f64, Error> {
    match field {
        Some(amount) if amount != 0.0 => Ok(amount),
        _ => Err(Error::MissingFields),
    }
}
