//! Serialize target records as delimited text.
//!
//! The header is the union of all record columns in first-seen order, so
//! columns that only exist on some rows (tags, images) still get a stable
//! position. Every field is quoted: descriptions routinely contain commas
//! and newlines.

use csv::{QuoteStyle, Terminator, WriterBuilder};
use indexmap::IndexSet;

use crate::error::{EncodeError, EncodeResult};
use crate::models::TargetRecord;

/// Ordered union of the columns of `records`.
pub fn column_union(records: &[TargetRecord]) -> Vec<String> {
    let mut columns: IndexSet<&str> = IndexSet::new();
    for record in records {
        columns.extend(record.columns());
    }
    columns.into_iter().map(str::to_string).collect()
}

/// Encode records as comma-separated text, header first.
///
/// An empty record set encodes to an empty string.
pub fn encode_records(records: &[TargetRecord]) -> EncodeResult<String> {
    if records.is_empty() {
        return Ok(String::new());
    }

    let columns = column_union(records);

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(&columns)?;
    for record in records {
        writer.write_record(columns.iter().map(|column| record.text(column)))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| EncodeError::Io(std::io::Error::new(e.error().kind(), e.to_string())))?;

    Ok(String::from_utf8(bytes)?)
}
