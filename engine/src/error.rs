//! Error types for the Shopify to Medusa conversion pipeline.
//!
//! One error type per pipeline stage:
//!
//! - [`DecodeError`] - Reading the Shopify export
//! - [`OptionsError`] - Invalid conversion options
//! - [`EncodeError`] - Writing the Medusa import
//! - [`ConvertError`] - Top-level orchestration errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.
//!
//! Malformed markup in product descriptions never produces an error:
//! the normalizer degrades to plain text instead.

use thiserror::Error;

// =============================================================================
// Decoding Errors
// =============================================================================

/// Errors while decoding the source export into records.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// Input bytes could not be turned into text.
    #[error("Failed to decode text: {0}")]
    Encoding(String),

    /// Malformed delimited text.
    #[error("Line {line}: {message}")]
    Parse { line: u64, message: String },

    /// No header row (empty input).
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for DecodeError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map(|p| p.line()).unwrap_or(0);
        DecodeError::Parse {
            line,
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Options Errors
// =============================================================================

/// Errors in user-supplied conversion options.
#[derive(Debug, Error, PartialEq)]
pub enum OptionsError {
    /// Currency code left empty.
    #[error("A target currency code is required")]
    MissingCurrency,

    /// Currency code is not three letters.
    #[error("Invalid currency code '{0}': expected three letters such as EUR")]
    InvalidCurrency(String),
}

// =============================================================================
// Encoding Errors
// =============================================================================

/// Errors while serializing target records.
///
/// Practically unreachable for in-memory output.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// CSV writer failure.
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    /// Buffer flush failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer produced invalid UTF-8.
    #[error("Output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

// =============================================================================
// Conversion Errors (top-level)
// =============================================================================

/// Top-level conversion errors.
///
/// This is the error type returned by [`crate::transform::pipeline::convert_bytes`].
/// Every variant is fatal to one invocation only; the host may retry with
/// a different file.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Source could not be decoded.
    #[error("CSV error: {0}")]
    Decode(#[from] DecodeError),

    /// Output could not be encoded.
    #[error("Output error: {0}")]
    Encode(#[from] EncodeError),

    /// Options rejected.
    #[error("Options error: {0}")]
    Options(#[from] OptionsError),

    /// Decoding produced no records.
    #[error("No products found in CSV")]
    EmptyInput,

    /// A column the conversion depends on is missing from the header.
    #[error("Missing required column: {0}")]
    MissingColumn(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for decoding.
pub type DecodeResult<T> = Result<T, DecodeError>;

/// Result type for encoding.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Result type for the whole conversion.
pub type ConvertResult<T> = Result<T, ConvertError>;
