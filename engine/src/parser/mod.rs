//! Delimited-text decoder with encoding and delimiter auto-detection.
//!
//! Turns a product export into header-keyed [`SourceRecord`]s. No
//! Shopify-specific logic here beyond the record type.

use csv::{ReaderBuilder, Trim};
use std::path::Path;

use crate::error::{DecodeError, DecodeResult};
use crate::models::SourceRecord;

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed records, in file order
    pub records: Vec<SourceRecord>,
    /// Detected or used encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: u8,
    /// Column headers
    pub headers: Vec<String>,
}

/// Detect the encoding of raw bytes.
///
/// Valid UTF-8 wins outright; chardet is only consulted for other input.
pub fn detect_encoding(bytes: &[u8]) -> String {
    if std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown labels fall back to lossy UTF-8. A leading byte-order mark is
/// removed.
pub fn decode_content(bytes: &[u8], encoding: &str) -> DecodeResult<String> {
    let text = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => String::from_utf8_lossy(bytes).into_owned(),
        // WHATWG maps latin1 onto windows-1252, a superset over printable bytes
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => {
            encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned()
        }
        label => match encoding_rs::Encoding::for_label(label.as_bytes()) {
            Some(enc) => {
                let (text, _, had_errors) = enc.decode(bytes);
                if had_errors {
                    return Err(DecodeError::Encoding(format!(
                        "input is not valid {}",
                        enc.name()
                    )));
                }
                text.into_owned()
            }
            None => String::from_utf8_lossy(bytes).into_owned(),
        },
    };

    if text.starts_with('\u{feff}') {
        Ok(text['\u{feff}'.len_utf8()..].to_string())
    } else {
        Ok(text)
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to a comma when the line holds no candidate at all.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [b',', b';', b'\t', b'|'];
    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep as char).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text with an explicit delimiter.
///
/// Rows shorter than the header are padded with empty strings; extra
/// trailing fields are ignored. Blank rows are skipped.
///
/// # Example
/// ```ignore
/// use shop2medusa::parser::parse_str;
///
/// let result = parse_str("Handle,Title\nshirt,Shirt", b',').unwrap();
///
/// assert_eq!(result.records.len(), 1);
/// assert_eq!(result.records[0].get("Title"), "Shirt");
/// ```
pub fn parse_str(content: &str, delimiter: u8) -> DecodeResult<ParseResult> {
    parse_with_metadata(content, delimiter, "utf-8".to_string())
}

/// Parse CSV bytes with auto-detection of encoding and delimiter.
pub fn parse_bytes_auto(bytes: &[u8]) -> DecodeResult<ParseResult> {
    // Detect encoding
    let encoding = detect_encoding(bytes);

    // Decode content
    let content = decode_content(bytes, &encoding)?;

    // Detect delimiter
    let delimiter = detect_delimiter(&content);

    parse_with_metadata(&content, delimiter, encoding)
}

/// Parse CSV file with auto-detection of encoding and delimiter.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> DecodeResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}

fn parse_with_metadata(
    content: &str,
    delimiter: u8,
    encoding: String,
) -> DecodeResult<ParseResult> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(DecodeError::NoHeaders);
    }

    let mut records = Vec::new();

    for row in reader.records() {
        let row = row?;

        if row.iter().all(|field| field.is_empty()) {
            continue;
        }

        let mut record = SourceRecord::new();
        for (i, header) in headers.iter().enumerate() {
            // Duplicate header names keep the first column's value.
            if record.contains(header) {
                continue;
            }
            record.insert(header.as_str(), row.get(i).unwrap_or(""));
        }

        records.push(record);
    }

    Ok(ParseResult {
        records,
        encoding,
        delimiter,
        headers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_simple_csv() {
        let csv = "Handle,Title\nshirt,Shirt\nmug,Mug";
        let result = parse_str(csv, b',').unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].get("Handle"), "shirt");
        assert_eq!(result.records[0].get("Title"), "Shirt");
        assert_eq!(result.records[1].get("Handle"), "mug");
        assert_eq!(result.headers, vec!["Handle", "Title"]);
    }

    #[test]
    fn test_quoted_values_with_delimiters_and_newlines() {
        let csv = "Handle,Body (HTML)\nshirt,\"<p>Soft, warm</p>\n<p>Cotton</p>\"";
        let result = parse_str(csv, b',').unwrap();

        assert_eq!(result.records.len(), 1);
        assert_eq!(
            result.records[0].get("Body (HTML)"),
            "<p>Soft, warm</p>\n<p>Cotton</p>"
        );
    }

    #[test]
    fn test_empty_lines_skipped() {
        let csv = "a,b\n1,2\n\n3,4\n\n";
        let result = parse_str(csv, b',').unwrap();

        assert_eq!(result.records.len(), 2);
    }

    #[test]
    fn test_all_empty_row_skipped() {
        let csv = "a,b\n1,2\n,\n";
        let result = parse_str(csv, b',').unwrap();

        assert_eq!(result.records.len(), 1);
    }

    #[test]
    fn test_missing_values() {
        let csv = "a,b,c\n1\n4,,6";
        let result = parse_str(csv, b',').unwrap();

        assert_eq!(result.records[0].get("a"), "1");
        assert_eq!(result.records[0].get("b"), "");
        assert_eq!(result.records[0].get("c"), "");
        assert!(result.records[0].contains("c"));
        assert_eq!(result.records[1].get("b"), "");
        assert_eq!(result.records[1].get("c"), "6");
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "a,b\n1,2,3,4";
        let result = parse_str(csv, b',').unwrap();

        assert_eq!(result.records[0].len(), 2);
        assert_eq!(result.records[0].get("a"), "1");
        assert_eq!(result.records[0].get("b"), "2");
    }

    #[test]
    fn test_values_kept_verbatim_headers_trimmed() {
        let csv = " Handle , Option1 Value \nshirt, Small ";
        let result = parse_str(csv, b',').unwrap();

        assert_eq!(result.records[0].get("Option1 Value"), " Small ");
    }

    #[test]
    fn test_duplicate_header_keeps_first() {
        let csv = "Handle,Title,Title\nshirt,First,Second";
        let result = parse_str(csv, b',').unwrap();

        assert_eq!(result.records[0].get("Title"), "First");
    }

    #[test]
    fn test_header_only_yields_zero_records() {
        let result = parse_str("Handle,Title\n", b',').unwrap();
        assert!(result.records.is_empty());
        assert_eq!(result.headers.len(), 2);
    }

    #[test]
    fn test_empty_input_is_error() {
        let err = parse_str("", b',').unwrap_err();
        assert!(matches!(err, DecodeError::NoHeaders));
    }

    #[test]
    fn test_detect_delimiter_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
    }

    #[test]
    fn test_detect_delimiter_semicolon() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
    }

    #[test]
    fn test_detect_delimiter_tab() {
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), b'\t');
    }

    #[test]
    fn test_detect_delimiter_single_column() {
        assert_eq!(detect_delimiter("Handle\nshirt"), b',');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "Handle;Title\nshirt;Shirt\nmug;Mug";
        let result = parse_bytes_auto(csv.as_bytes()).unwrap();

        assert_eq!(result.delimiter, b';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.headers, vec!["Handle", "Title"]);
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = b"\xEF\xBB\xBFHandle,Title\nshirt,Shirt";
        let result = parse_bytes_auto(bytes).unwrap();

        assert_eq!(result.headers[0], "Handle");
        assert_eq!(result.records[0].handle(), "shirt");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_fractions_and_currency_sign() {
        let decoded = decode_content(&[0xBD, 0xBC, 0xBE, 0xA4], "iso-8859-1").unwrap();
        assert_eq!(decoded, "½¼¾¤");
    }

    #[test]
    fn test_latin9_keeps_euro_sign() {
        let decoded = decode_content(&[0x31, 0x30, 0xA4], "iso-8859-15").unwrap();
        assert_eq!(decoded, "10€");
    }

    #[test]
    fn test_auto_parse_latin1_fraction() {
        let bytes: &[u8] = b"Handle,Title\nmug,\"Tasse \xE0 caf\xE9 ... contenance \xBD litre ...\"\ncup,\"Cr\xE8me br\xFBl\xE9e \xE9t\xE9 \xBC\"\n";
        let result = parse_bytes_auto(bytes).unwrap();

        assert_eq!(result.encoding, "iso-8859-1");
        assert_eq!(
            result.records[0].get("Title"),
            "Tasse à café ... contenance ½ litre ..."
        );
        assert_eq!(result.records[1].get("Title"), "Crème brûlée été ¼");
    }

    #[test]
    fn test_parse_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Handle,Title\nshirt,Shirt\n").unwrap();

        let result = parse_csv_file_auto(file.path()).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].get("Title"), "Shirt");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = parse_csv_file_auto("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }
}
