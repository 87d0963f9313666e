//! # Shop2Medusa - Shopify product export to MedusaJS import
//!
//! Shop2Medusa converts the product CSV exported by Shopify into the product
//! import CSV expected by MedusaJS. Everything runs locally on the caller's
//! data; nothing is sent anywhere.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Shopify    │────▶│   Parser    │────▶│  Transform  │────▶│   Writer    │
//! │  CSV export │     │  (auto-enc) │     │ (group+map) │     │ (Medusa CSV)│
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop2medusa::{convert_bytes, ConversionOptions};
//!
//! let bytes = std::fs::read("products_export.csv").unwrap();
//! let options = ConversionOptions::new("EUR").with_markdown(true);
//! let output = convert_bytes(&bytes, options).unwrap();
//! println!("Converted {} products", output.summary.products);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per pipeline stage
//! - [`models`] - Records, options, column names
//! - [`parser`] - CSV decoding with auto-detection
//! - [`markdown`] - HTML description to Markdown
//! - [`transform`] - Grouping, mapping, and pipeline
//! - [`writer`] - CSV encoding
//! - [`validation`] - Option and header checks
//! - [`logs`] - Progress log stream

// Core modules
pub mod error;
pub mod models;

// Decoding and encoding
pub mod parser;
pub mod writer;

// Transformation
pub mod markdown;
pub mod transform;

// Checks
pub mod validation;

// Progress
pub mod logs;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{ConvertError, DecodeError, EncodeError, OptionsError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    ConversionOptions,
    ConversionSummary,
    FieldValue,
    ProductGroup,
    SourceRecord,
    TargetRecord,
    DEFAULT_SALES_CHANNEL,
};

// =============================================================================
// Re-exports - Decoding / Encoding
// =============================================================================

pub use parser::{
    parse_str,
    parse_bytes_auto,
    parse_csv_file_auto,
    detect_encoding,
    detect_delimiter,
    decode_content,
    ParseResult,
};

pub use writer::{column_union, encode_records};

// =============================================================================
// Re-exports - Markdown
// =============================================================================

pub use markdown::{html_to_markdown, HtmlToMarkdown, MarkupNormalizer};

// =============================================================================
// Re-exports - Transform / Pipeline
// =============================================================================

pub use transform::{
    group_by_handle,
    to_medusa_records,
    ProductMapper,
    convert_bytes,
    convert_bytes_async,
    convert_str,
    summarize,
    ConversionOutput,
    SourceInfo,
};
