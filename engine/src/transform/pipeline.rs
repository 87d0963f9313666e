//! High-level pipeline API for Shopify to Medusa conversion.
//!
//! Combines all steps: decoding, grouping, mapping, encoding, and the
//! summary shown to the user. A conversion is all-or-nothing: either a
//! complete CSV comes back, or an error and no output.
//!
//! # Example
//!
//! ```rust,ignore
//! use shop2medusa::{convert_bytes, ConversionOptions};
//!
//! let bytes = std::fs::read("products_export.csv")?;
//! let output = convert_bytes(&bytes, ConversionOptions::new("EUR"))?;
//!
//! println!(
//!     "{} products, {} variants",
//!     output.summary.products, output.summary.variants
//! );
//! std::fs::write("medusa-import.csv", output.csv)?;
//! ```

use serde::Serialize;
use std::collections::HashSet;

use crate::error::{ConvertError, ConvertResult};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::models::{medusa, ConversionOptions, ConversionSummary, SourceRecord, TargetRecord};
use crate::parser::{detect_delimiter, parse_bytes_auto, parse_str, ParseResult};
use crate::validation::{validate_headers, validate_options};
use crate::writer::encode_records;

use super::medusa::to_medusa_records;

/// Result of a complete conversion
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// Medusa import CSV
    pub csv: String,

    /// Product and variant counts of `csv`
    pub summary: ConversionSummary,

    /// What the decoder saw
    pub source: SourceInfo,
}

/// Source file information
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub encoding: String,
    pub delimiter: char,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Convert raw export bytes (any supported encoding).
pub fn convert_bytes(bytes: &[u8], options: ConversionOptions) -> ConvertResult<ConversionOutput> {
    reported(run_bytes(bytes, options))
}

/// Convert export text that is already decoded.
pub fn convert_str(content: &str, options: ConversionOptions) -> ConvertResult<ConversionOutput> {
    reported(run_str(content, options))
}

/// Same as [`convert_bytes`], yielding to the scheduler between stages so
/// a host event loop stays responsive on large exports.
pub async fn convert_bytes_async(
    bytes: &[u8],
    options: ConversionOptions,
) -> ConvertResult<ConversionOutput> {
    reported(run_bytes_async(bytes, options).await)
}

fn run_bytes(bytes: &[u8], options: ConversionOptions) -> ConvertResult<ConversionOutput> {
    let options = validate_options(options)?;
    let (records, source) = decode_bytes(bytes)?;
    let mapped = transform_records(records, &source.headers, &options)?;
    finish(source, &mapped)
}

fn run_str(content: &str, options: ConversionOptions) -> ConvertResult<ConversionOutput> {
    let options = validate_options(options)?;
    log_info("📖 Reading CSV...");
    let parsed = parse_str(content, detect_delimiter(content))?;
    log_parsed(&parsed);
    let (records, source) = split_parsed(parsed);
    let mapped = transform_records(records, &source.headers, &options)?;
    finish(source, &mapped)
}

async fn run_bytes_async(
    bytes: &[u8],
    options: ConversionOptions,
) -> ConvertResult<ConversionOutput> {
    let options = validate_options(options)?;
    let (records, source) = decode_bytes(bytes)?;
    tokio::task::yield_now().await;
    let mapped = transform_records(records, &source.headers, &options)?;
    tokio::task::yield_now().await;
    finish(source, &mapped)
}

/// Counts computed from output rows, so dropped stray rows never count.
pub fn summarize(records: &[TargetRecord]) -> ConversionSummary {
    let handles: HashSet<String> = records
        .iter()
        .map(|r| r.text(medusa::PRODUCT_HANDLE))
        .collect();

    ConversionSummary {
        products: handles.len(),
        variants: records.len(),
    }
}

/// Send a failed conversion to the log stream before handing it back.
fn reported<T>(result: ConvertResult<T>) -> ConvertResult<T> {
    if let Err(e) = &result {
        log_error(e.to_string());
    }
    result
}

fn decode_bytes(bytes: &[u8]) -> ConvertResult<(Vec<SourceRecord>, SourceInfo)> {
    log_info("📖 Reading CSV...");
    log_info("Detecting encoding and separator...");
    let parsed = parse_bytes_auto(bytes)?;
    log_success(format!("Detected encoding: {}", parsed.encoding));
    log_parsed(&parsed);
    Ok(split_parsed(parsed))
}

fn log_parsed(parsed: &ParseResult) {
    log_success(format!(
        "Detected separator: '{}'",
        format_delimiter(parsed.delimiter)
    ));
    log_success(format!(
        "Read {} rows, {} columns",
        parsed.records.len(),
        parsed.headers.len()
    ));
}

/// Move the rows out, keep the rest as [`SourceInfo`].
fn split_parsed(parsed: ParseResult) -> (Vec<SourceRecord>, SourceInfo) {
    let source = SourceInfo {
        encoding: parsed.encoding,
        delimiter: parsed.delimiter as char,
        headers: parsed.headers,
        row_count: parsed.records.len(),
    };
    (parsed.records, source)
}

/// Guard, group and map. The rows are consumed by the mapper.
fn transform_records(
    records: Vec<SourceRecord>,
    headers: &[String],
    options: &ConversionOptions,
) -> ConvertResult<Vec<TargetRecord>> {
    if records.is_empty() {
        return Err(ConvertError::EmptyInput);
    }
    validate_headers(headers)?;

    log_info(format!(
        "🔄 Converting to Medusa format (prices in {})...",
        options.currency_code
    ));
    if options.convert_description_to_markdown {
        log_info_indent("Descriptions will be converted to Markdown", 1);
    }
    if let Some(channel) = &options.sales_channel {
        log_info_indent(format!("Sales channel: {}", channel), 1);
    }

    let row_count = records.len();
    let mapped = to_medusa_records(records, options);

    let dropped = row_count - mapped.len();
    if dropped > 0 {
        log_warning(format!("{} rows without handle skipped", dropped));
    }

    Ok(mapped)
}

fn finish(source: SourceInfo, records: &[TargetRecord]) -> ConvertResult<ConversionOutput> {
    log_info("💾 Writing Medusa CSV...");
    let csv = encode_records(records)?;

    let summary = summarize(records);
    log_success(format!(
        "Successfully processed {} products and {} variants",
        summary.products, summary.variants
    ));

    Ok(ConversionOutput { csv, summary, source })
}

/// Format delimiter for display
fn format_delimiter(d: u8) -> String {
    match d {
        b'\t' => "TAB".to_string(),
        c => (c as char).to_string(),
    }
}
