//! Minimal structural checks run before a conversion.
//!
//! Only two things are checked: the options carry a usable currency code,
//! and the export has the column products are grouped by. Everything else
//! in the export is taken as-is.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{ConvertError, OptionsError};
use crate::models::{shopify, ConversionOptions};

static CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("valid regex"));

/// Check a (normalized) currency code.
///
/// # Example
/// ```ignore
/// use shop2medusa::validation::validate_currency;
///
/// assert!(validate_currency("EUR").is_ok());
/// assert!(validate_currency("EURO").is_err());
/// ```
pub fn validate_currency(code: &str) -> Result<(), OptionsError> {
    if code.is_empty() {
        return Err(OptionsError::MissingCurrency);
    }
    if !CURRENCY_CODE.is_match(code) {
        return Err(OptionsError::InvalidCurrency(code.to_string()));
    }
    Ok(())
}

/// Normalize and check options in one go.
pub fn validate_options(options: ConversionOptions) -> Result<ConversionOptions, OptionsError> {
    let options = options.normalized();
    validate_currency(&options.currency_code)?;
    Ok(options)
}

/// The export must carry the `Handle` column.
pub fn validate_headers(headers: &[String]) -> Result<(), ConvertError> {
    if headers.iter().any(|h| h == shopify::HANDLE) {
        Ok(())
    } else {
        Err(ConvertError::MissingColumn(shopify::HANDLE.to_string()))
    }
}
