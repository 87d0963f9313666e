//! Domain models for the Shopify to Medusa conversion pipeline.
//!
//! - [`SourceRecord`] - One row of a Shopify product export
//! - [`ProductGroup`] - Rows sharing one handle (a product and its variants)
//! - [`TargetRecord`] - One row of a Medusa product import
//! - [`FieldValue`] - Scalar cell of a target record
//! - [`ConversionOptions`] - User choices for one conversion
//! - [`ConversionSummary`] - Product and variant counts of an output
//!
//! Column names live in [`shopify`] and [`medusa`]. They are bit-exact:
//! Medusa matches import headers literally.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Column Names
// =============================================================================

/// Column names of the Shopify product export.
pub mod shopify {
    pub const HANDLE: &str = "Handle";
    pub const TITLE: &str = "Title";
    pub const BODY_HTML: &str = "Body (HTML)";
    pub const VENDOR: &str = "Vendor";
    pub const TYPE: &str = "Type";
    pub const TAGS: &str = "Tags";
    pub const PUBLISHED: &str = "Published";
    pub const OPTION1_NAME: &str = "Option1 Name";
    pub const OPTION1_VALUE: &str = "Option1 Value";
    pub const OPTION2_NAME: &str = "Option2 Name";
    pub const OPTION2_VALUE: &str = "Option2 Value";
    pub const OPTION3_NAME: &str = "Option3 Name";
    pub const OPTION3_VALUE: &str = "Option3 Value";
    pub const VARIANT_SKU: &str = "Variant SKU";
    pub const VARIANT_GRAMS: &str = "Variant Grams";
    pub const VARIANT_INVENTORY_QTY: &str = "Variant Inventory Qty";
    pub const VARIANT_PRICE: &str = "Variant Price";
    pub const IMAGE_SRC: &str = "Image Src";
    pub const IMAGE_POSITION: &str = "Image Position";
    pub const IMAGE_ALT_TEXT: &str = "Image Alt Text";

    /// `(name column, value column)` for option slots 1 to 3.
    pub const OPTIONS: [(&str, &str); 3] = [
        (OPTION1_NAME, OPTION1_VALUE),
        (OPTION2_NAME, OPTION2_VALUE),
        (OPTION3_NAME, OPTION3_VALUE),
    ];
}

/// Column names of the Medusa product import template.
pub mod medusa {
    pub const PRODUCT_ID: &str = "Product Id";
    pub const PRODUCT_HANDLE: &str = "Product Handle";
    pub const PRODUCT_TITLE: &str = "Product Title";
    pub const PRODUCT_SUBTITLE: &str = "Product Subtitle";
    pub const PRODUCT_DESCRIPTION: &str = "Product Description";
    pub const PRODUCT_STATUS: &str = "Product Status";
    pub const PRODUCT_THUMBNAIL: &str = "Product Thumbnail";
    pub const PRODUCT_WEIGHT: &str = "Product Weight";
    pub const PRODUCT_LENGTH: &str = "Product Length";
    pub const PRODUCT_WIDTH: &str = "Product Width";
    pub const PRODUCT_HEIGHT: &str = "Product Height";
    pub const PRODUCT_HS_CODE: &str = "Product HS Code";
    pub const PRODUCT_ORIGIN_COUNTRY: &str = "Product Origin Country";
    pub const PRODUCT_MID_CODE: &str = "Product MID Code";
    pub const PRODUCT_MATERIAL: &str = "Product Material";
    pub const SHIPPING_PROFILE_ID: &str = "Shipping Profile Id";
    pub const PRODUCT_SALES_CHANNEL_1: &str = "Product Sales Channel 1";
    pub const PRODUCT_COLLECTION_ID: &str = "Product Collection Id";
    pub const PRODUCT_TYPE_ID: &str = "Product Type Id";
    pub const PRODUCT_DISCOUNTABLE: &str = "Product Discountable";
    pub const PRODUCT_EXTERNAL_ID: &str = "Product External Id";
    pub const VARIANT_ID: &str = "Variant Id";
    pub const VARIANT_TITLE: &str = "Variant Title";
    pub const VARIANT_SKU: &str = "Variant SKU";
    pub const VARIANT_BARCODE: &str = "Variant Barcode";
    pub const VARIANT_ALLOW_BACKORDER: &str = "Variant Allow Backorder";
    pub const VARIANT_MANAGE_INVENTORY: &str = "Variant Manage Inventory";
    pub const VARIANT_WEIGHT: &str = "Variant Weight";
    pub const VARIANT_LENGTH: &str = "Variant Length";
    pub const VARIANT_WIDTH: &str = "Variant Width";
    pub const VARIANT_HEIGHT: &str = "Variant Height";
    pub const VARIANT_HS_CODE: &str = "Variant HS Code";
    pub const VARIANT_ORIGIN_COUNTRY: &str = "Variant Origin Country";
    pub const VARIANT_MID_CODE: &str = "Variant MID Code";
    pub const VARIANT_MATERIAL: &str = "Variant Material";
    pub const VARIANT_OPTION_1_NAME: &str = "Variant Option 1 Name";
    pub const VARIANT_OPTION_1_VALUE: &str = "Variant Option 1 Value";
    pub const VARIANT_OPTION_2_NAME: &str = "Variant Option 2 Name";
    pub const VARIANT_OPTION_2_VALUE: &str = "Variant Option 2 Value";
    pub const VARIANT_OPTION_3_NAME: &str = "Variant Option 3 Name";
    pub const VARIANT_OPTION_3_VALUE: &str = "Variant Option 3 Value";

    /// `(name column, value column)` for option slots 1 to 3.
    pub const OPTIONS: [(&str, &str); 3] = [
        (VARIANT_OPTION_1_NAME, VARIANT_OPTION_1_VALUE),
        (VARIANT_OPTION_2_NAME, VARIANT_OPTION_2_VALUE),
        (VARIANT_OPTION_3_NAME, VARIANT_OPTION_3_VALUE),
    ];

    /// Fixed columns in template order. Dynamic columns follow them.
    pub const FIXED_COLUMNS: [&str; 41] = [
        PRODUCT_ID,
        PRODUCT_HANDLE,
        PRODUCT_TITLE,
        PRODUCT_SUBTITLE,
        PRODUCT_DESCRIPTION,
        PRODUCT_STATUS,
        PRODUCT_THUMBNAIL,
        PRODUCT_WEIGHT,
        PRODUCT_LENGTH,
        PRODUCT_WIDTH,
        PRODUCT_HEIGHT,
        PRODUCT_HS_CODE,
        PRODUCT_ORIGIN_COUNTRY,
        PRODUCT_MID_CODE,
        PRODUCT_MATERIAL,
        SHIPPING_PROFILE_ID,
        PRODUCT_SALES_CHANNEL_1,
        PRODUCT_COLLECTION_ID,
        PRODUCT_TYPE_ID,
        PRODUCT_DISCOUNTABLE,
        PRODUCT_EXTERNAL_ID,
        VARIANT_ID,
        VARIANT_TITLE,
        VARIANT_SKU,
        VARIANT_BARCODE,
        VARIANT_ALLOW_BACKORDER,
        VARIANT_MANAGE_INVENTORY,
        VARIANT_WEIGHT,
        VARIANT_LENGTH,
        VARIANT_WIDTH,
        VARIANT_HEIGHT,
        VARIANT_HS_CODE,
        VARIANT_ORIGIN_COUNTRY,
        VARIANT_MID_CODE,
        VARIANT_MATERIAL,
        VARIANT_OPTION_1_NAME,
        VARIANT_OPTION_1_VALUE,
        VARIANT_OPTION_2_NAME,
        VARIANT_OPTION_2_VALUE,
        VARIANT_OPTION_3_NAME,
        VARIANT_OPTION_3_VALUE,
    ];

    /// `Variant Price <CODE>`; `code` is expected uppercase already.
    pub fn price_column(code: &str) -> String {
        format!("Variant Price {}", code)
    }

    /// `Product Tag <N>`, 1-based.
    pub fn tag_column(position: usize) -> String {
        format!("Product Tag {}", position)
    }

    /// `Product Image <N> Url`, 1-based.
    pub fn image_column(position: usize) -> String {
        format!("Product Image {} Url", position)
    }
}

// =============================================================================
// Source Side
// =============================================================================

/// One row of the source export, keyed by header name.
///
/// Absent columns read as the empty string, matching how exports leave
/// trailing cells off short rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRecord {
    fields: IndexMap<String, String>,
}

impl SourceRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `column`, or `""` when the column is missing.
    pub fn get(&self, column: &str) -> &str {
        self.fields.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Grouping key (the Shopify handle).
    pub fn handle(&self) -> &str {
        self.get(shopify::HANDLE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SourceRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = SourceRecord::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

/// Source rows sharing one handle, in file order.
///
/// Never empty: a group is only created when its first row is seen.
#[derive(Debug, Clone)]
pub struct ProductGroup {
    pub handle: String,
    pub rows: Vec<SourceRecord>,
}

impl ProductGroup {
    /// Row carrying the product-level attributes.
    pub fn parent(&self) -> &SourceRecord {
        &self.rows[0]
    }

    /// Non-empty image references across all rows, deduplicated,
    /// in first-seen order.
    pub fn images(&self) -> Vec<&str> {
        let images: IndexSet<&str> = self
            .rows
            .iter()
            .map(|r| r.get(shopify::IMAGE_SRC))
            .filter(|src| !src.is_empty())
            .collect();
        images.into_iter().collect()
    }
}

// =============================================================================
// Target Side
// =============================================================================

/// Scalar cell of a [`TargetRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Bool(true) => f.write_str("TRUE"),
            FieldValue::Bool(false) => f.write_str("FALSE"),
            FieldValue::Empty => Ok(()),
        }
    }
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Text(s) => s.is_empty(),
            FieldValue::Empty => true,
            _ => false,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

/// One row of the Medusa import: an insertion-ordered column map.
///
/// Rows of one output may carry different column sets (tag and image
/// columns only appear on a product's first row); the writer takes the
/// union.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TargetRecord {
    fields: IndexMap<String, FieldValue>,
}

impl TargetRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(column.into(), value.into());
    }

    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// Rendered cell text; `""` for missing columns.
    pub fn text(&self, column: &str) -> String {
        self.get(column).map(ToString::to_string).unwrap_or_default()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.fields.contains_key(column)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// =============================================================================
// Options and Summary
// =============================================================================

/// Label used when the sales channel is enabled without a name.
pub const DEFAULT_SALES_CHANNEL: &str = "default";

/// User choices for one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionOptions {
    /// Target currency, e.g. `EUR`. Normalized to uppercase.
    pub currency_code: String,

    /// Turn `Body (HTML)` into Markdown.
    #[serde(default)]
    pub convert_description_to_markdown: bool,

    /// Sales channel label; `None` leaves products unassigned.
    #[serde(default)]
    pub sales_channel: Option<String>,
}

impl ConversionOptions {
    pub fn new(currency_code: impl AsRef<str>) -> Self {
        Self {
            currency_code: currency_code.as_ref().trim().to_uppercase(),
            convert_description_to_markdown: false,
            sales_channel: None,
        }
    }

    pub fn with_markdown(mut self, enabled: bool) -> Self {
        self.convert_description_to_markdown = enabled;
        self
    }

    /// `Some("")` is replaced by [`DEFAULT_SALES_CHANNEL`].
    pub fn with_sales_channel(mut self, channel: Option<String>) -> Self {
        self.sales_channel = channel.map(|c| {
            let c = c.trim();
            if c.is_empty() {
                DEFAULT_SALES_CHANNEL.to_string()
            } else {
                c.to_string()
            }
        });
        self
    }

    /// Same options with the currency code trimmed and uppercased.
    /// Needed for values that arrive through deserialization.
    pub fn normalized(self) -> Self {
        let Self {
            currency_code,
            convert_description_to_markdown,
            sales_channel,
        } = self;
        Self::new(currency_code)
            .with_markdown(convert_description_to_markdown)
            .with_sales_channel(sales_channel)
    }

    /// Name of the price column for this run.
    pub fn price_column(&self) -> String {
        medusa::price_column(&self.currency_code)
    }
}

/// Counts reported after a conversion, computed from the output rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Distinct product handles.
    pub products: usize,
    /// Output rows (one per variant).
    pub variants: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> SourceRecord {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_source_record_missing_column_is_empty() {
        let r = row(&[("Handle", "shirt")]);
        assert_eq!(r.handle(), "shirt");
        assert_eq!(r.get("Title"), "");
        assert!(!r.contains("Title"));
    }

    #[test]
    fn test_group_images_deduplicated_in_order() {
        let group = ProductGroup {
            handle: "shirt".into(),
            rows: vec![
                row(&[("Handle", "shirt"), ("Image Src", "x.png")]),
                row(&[("Handle", "shirt"), ("Image Src", "")]),
                row(&[("Handle", "shirt"), ("Image Src", "x.png")]),
                row(&[("Handle", "shirt"), ("Image Src", "y.png")]),
            ],
        };
        assert_eq!(group.images(), vec!["x.png", "y.png"]);
        assert_eq!(group.parent().get("Image Src"), "x.png");
    }

    #[test]
    fn test_group_images_many_repeated_rows() {
        let rows = (0..500)
            .map(|i| {
                let src = format!("img-{}.png", i % 7);
                row(&[("Handle", "shirt"), ("Image Src", src.as_str())])
            })
            .collect();
        let group = ProductGroup { handle: "shirt".into(), rows };

        let images = group.images();
        assert_eq!(images.len(), 7);
        assert_eq!(images[0], "img-0.png");
        assert_eq!(images[6], "img-6.png");
    }

    #[test]
    fn test_field_value_rendering() {
        assert_eq!(FieldValue::from(true).to_string(), "TRUE");
        assert_eq!(FieldValue::from(false).to_string(), "FALSE");
        assert_eq!(FieldValue::from(10.0).to_string(), "10");
        assert_eq!(FieldValue::from(19.99).to_string(), "19.99");
        assert_eq!(FieldValue::Empty.to_string(), "");
        assert!(FieldValue::from("").is_empty());
        assert!(!FieldValue::from(false).is_empty());
    }

    #[test]
    fn test_target_record_keeps_insertion_order() {
        let mut r = TargetRecord::new();
        r.set("b", "2");
        r.set("a", "1");
        r.set("b", "3");
        assert_eq!(r.columns().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(r.text("b"), "3");
        assert_eq!(r.text("missing"), "");
    }

    #[test]
    fn test_options_normalize_currency() {
        let opts = ConversionOptions::new(" eur ");
        assert_eq!(opts.currency_code, "EUR");
        assert_eq!(opts.price_column(), "Variant Price EUR");
        assert!(!opts.convert_description_to_markdown);
        assert!(opts.sales_channel.is_none());
    }

    #[test]
    fn test_options_sales_channel_default() {
        let opts = ConversionOptions::new("usd").with_sales_channel(Some(String::new()));
        assert_eq!(opts.sales_channel.as_deref(), Some(DEFAULT_SALES_CHANNEL));

        let opts = ConversionOptions::new("usd").with_sales_channel(Some("Web".into()));
        assert_eq!(opts.sales_channel.as_deref(), Some("Web"));
    }

    #[test]
    fn test_options_from_json() {
        let opts: ConversionOptions =
            serde_json::from_str(r#"{"currencyCode":"gbp","convertDescriptionToMarkdown":true}"#)
                .unwrap();
        let opts = opts.normalized();
        assert_eq!(opts.currency_code, "GBP");
        assert!(opts.convert_description_to_markdown);
        assert!(opts.sales_channel.is_none());
    }

    #[test]
    fn test_dynamic_column_names() {
        assert_eq!(medusa::price_column("USD"), "Variant Price USD");
        assert_eq!(medusa::tag_column(1), "Product Tag 1");
        assert_eq!(medusa::image_column(12), "Product Image 12 Url");
    }
}
