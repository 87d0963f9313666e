//! Map grouped Shopify rows onto the Medusa product import template.
//!
//! One output row per input row. The first row of each product carries the
//! product-level columns; sibling rows leave them empty and only fill
//! their own variant columns.
//!
//! Dynamic columns:
//!
//! - `Variant Price <CODE>` on every row, one currency per run
//! - `Product Tag <N>` on the first row, one per comma-separated tag
//! - `Product Image <N> Url` on the first row, one per distinct image

use crate::markdown::{HtmlToMarkdown, MarkupNormalizer};
use crate::models::{
    medusa, shopify, ConversionOptions, FieldValue, ProductGroup, SourceRecord, TargetRecord,
};

use super::grouper::group_by_handle;

/// Variant title used when the first option has no value.
pub const DEFAULT_VARIANT_TITLE: &str = "Default Variant";

/// Convert export rows to import rows with the default HTML normalizer.
pub fn to_medusa_records(
    records: Vec<SourceRecord>,
    options: &ConversionOptions,
) -> Vec<TargetRecord> {
    let normalizer = HtmlToMarkdown::new();
    ProductMapper::new(options, &normalizer).map_all(&group_by_handle(records))
}

/// Builds [`TargetRecord`]s for product groups under one set of options.
pub struct ProductMapper<'a> {
    options: &'a ConversionOptions,
    normalizer: &'a dyn MarkupNormalizer,
    price_column: String,
}

impl<'a> ProductMapper<'a> {
    pub fn new(options: &'a ConversionOptions, normalizer: &'a dyn MarkupNormalizer) -> Self {
        Self {
            options,
            normalizer,
            price_column: options.price_column(),
        }
    }

    /// Map every group, keeping group order and row order.
    pub fn map_all(&self, groups: &[ProductGroup]) -> Vec<TargetRecord> {
        groups.iter().flat_map(|group| self.map_group(group)).collect()
    }

    /// One record per row of `group`.
    pub fn map_group(&self, group: &ProductGroup) -> Vec<TargetRecord> {
        let images = group.images();

        group
            .rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                let mut record = self.base_record(&group.handle);
                if index == 0 {
                    self.fill_product(&mut record, group.parent(), &images);
                }
                self.fill_variant(&mut record, row);
                if index == 0 {
                    fill_tags(&mut record, group.parent().get(shopify::TAGS));
                    fill_images(&mut record, &images);
                }
                record
            })
            .collect()
    }

    /// Every fixed column, blank, in template order.
    fn base_record(&self, handle: &str) -> TargetRecord {
        let mut record = TargetRecord::new();
        for column in medusa::FIXED_COLUMNS {
            record.set(column, FieldValue::Empty);
        }
        record.set(medusa::PRODUCT_HANDLE, handle);
        record
    }

    fn fill_product(&self, record: &mut TargetRecord, parent: &SourceRecord, images: &[&str]) {
        record.set(medusa::PRODUCT_TITLE, parent.get(shopify::TITLE));
        record.set(medusa::PRODUCT_DESCRIPTION, self.description(parent));
        record.set(medusa::PRODUCT_STATUS, status(parent.get(shopify::PUBLISHED)));
        record.set(
            medusa::PRODUCT_THUMBNAIL,
            images.first().copied().unwrap_or(""),
        );
        record.set(medusa::PRODUCT_WEIGHT, parent.get(shopify::VARIANT_GRAMS));
        if let Some(channel) = &self.options.sales_channel {
            record.set(medusa::PRODUCT_SALES_CHANNEL_1, channel.as_str());
        }
        record.set(medusa::PRODUCT_TYPE_ID, parent.get(shopify::TYPE));
        record.set(medusa::PRODUCT_DISCOUNTABLE, true);
    }

    fn fill_variant(&self, record: &mut TargetRecord, row: &SourceRecord) {
        let title = match row.get(shopify::OPTION1_VALUE) {
            "" => DEFAULT_VARIANT_TITLE,
            value => value,
        };
        record.set(medusa::VARIANT_TITLE, title);
        record.set(medusa::VARIANT_SKU, row.get(shopify::VARIANT_SKU));
        record.set(medusa::VARIANT_ALLOW_BACKORDER, false);
        record.set(medusa::VARIANT_MANAGE_INVENTORY, true);
        record.set(medusa::VARIANT_WEIGHT, row.get(shopify::VARIANT_GRAMS));

        for ((src_name, src_value), (dst_name, dst_value)) in
            shopify::OPTIONS.iter().zip(medusa::OPTIONS.iter())
        {
            record.set(*dst_name, row.get(src_name));
            record.set(*dst_value, row.get(src_value));
        }

        record.set(self.price_column.as_str(), row.get(shopify::VARIANT_PRICE));
    }

    fn description(&self, parent: &SourceRecord) -> String {
        let body = parent.get(shopify::BODY_HTML);
        if self.options.convert_description_to_markdown && !body.is_empty() {
            self.normalizer.normalize(body)
        } else {
            body.to_string()
        }
    }
}

/// `Published` of exactly `TRUE` means published, anything else draft.
pub fn status(published: &str) -> &'static str {
    if published == "TRUE" {
        "published"
    } else {
        "draft"
    }
}

/// Split a comma-joined tag list into trimmed segments.
pub fn split_tags(tags: &str) -> Vec<&str> {
    if tags.is_empty() {
        return Vec::new();
    }
    tags.split(',').map(str::trim).collect()
}

fn fill_tags(record: &mut TargetRecord, tags: &str) {
    for (i, tag) in split_tags(tags).into_iter().enumerate() {
        record.set(medusa::tag_column(i + 1), tag);
    }
}

fn fill_images(record: &mut TargetRecord, images: &[&str]) {
    for (i, image) in images.iter().enumerate() {
        record.set(medusa::image_column(i + 1), *image);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> SourceRecord {
        pairs.iter().copied().collect()
    }

    fn convert(rows: Vec<SourceRecord>, currency: &str) -> Vec<TargetRecord> {
        to_medusa_records(rows, &ConversionOptions::new(currency))
    }

    #[test]
    fn test_shirt_two_variants() {
        let out = convert(
            vec![
                row(&[
                    ("Handle", "shirt"),
                    ("Title", "Shirt"),
                    ("Published", "TRUE"),
                    ("Option1 Name", "Size"),
                    ("Option1 Value", "Small"),
                    ("Variant Price", "10"),
                ]),
                row(&[
                    ("Handle", "shirt"),
                    ("Option1 Name", "Size"),
                    ("Option1 Value", "Large"),
                    ("Variant Price", "12"),
                ]),
            ],
            "USD",
        );

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].text("Product Title"), "Shirt");
        assert_eq!(out[0].text("Product Status"), "published");
        assert_eq!(out[0].text("Variant Price USD"), "10");
        assert_eq!(out[0].text("Variant Option 1 Value"), "Small");
        assert_eq!(out[0].text("Variant Title"), "Small");

        assert_eq!(out[1].text("Product Handle"), "shirt");
        assert_eq!(out[1].text("Product Title"), "");
        assert_eq!(out[1].text("Product Status"), "");
        assert_eq!(out[1].text("Variant Price USD"), "12");
        assert_eq!(out[1].text("Variant Option 1 Value"), "Large");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status("TRUE"), "published");
        assert_eq!(status("true"), "draft");
        assert_eq!(status("FALSE"), "draft");
        assert_eq!(status(""), "draft");
    }

    #[test]
    fn test_missing_published_is_draft() {
        let out = convert(vec![row(&[("Handle", "mug")])], "EUR");
        assert_eq!(out[0].text("Product Status"), "draft");
    }

    #[test]
    fn test_tag_expansion_first_row_only() {
        let out = convert(
            vec![
                row(&[("Handle", "shirt"), ("Tags", "a, b ,c")]),
                row(&[("Handle", "shirt"), ("Tags", "ignored")]),
            ],
            "EUR",
        );

        assert_eq!(out[0].text("Product Tag 1"), "a");
        assert_eq!(out[0].text("Product Tag 2"), "b");
        assert_eq!(out[0].text("Product Tag 3"), "c");
        assert!(!out[0].contains("Product Tag 4"));
        assert!(!out[1].contains("Product Tag 1"));
    }

    #[test]
    fn test_no_tags_no_tag_columns() {
        let out = convert(vec![row(&[("Handle", "mug"), ("Tags", "")])], "EUR");
        assert!(out[0].columns().all(|c| !c.starts_with("Product Tag")));
    }

    #[test]
    fn test_image_expansion_deduplicated() {
        let out = convert(
            vec![
                row(&[("Handle", "shirt"), ("Image Src", "x.png")]),
                row(&[("Handle", "shirt"), ("Image Src", "x.png")]),
                row(&[("Handle", "shirt"), ("Image Src", "y.png")]),
            ],
            "EUR",
        );

        assert_eq!(out[0].text("Product Thumbnail"), "x.png");
        assert_eq!(out[0].text("Product Image 1 Url"), "x.png");
        assert_eq!(out[0].text("Product Image 2 Url"), "y.png");
        assert!(!out[0].contains("Product Image 3 Url"));
        assert!(out[1..].iter().all(|r| !r.contains("Product Image 1 Url")));
        assert_eq!(out[2].text("Product Thumbnail"), "");
    }

    #[test]
    fn test_no_images_empty_thumbnail() {
        let out = convert(vec![row(&[("Handle", "mug")])], "EUR");
        assert_eq!(out[0].text("Product Thumbnail"), "");
        assert!(out[0].columns().all(|c| !c.starts_with("Product Image")));
    }

    #[test]
    fn test_currency_routing() {
        let rows = || vec![row(&[("Handle", "mug"), ("Variant Price", "19.99")])];

        let eur = convert(rows(), "EUR");
        assert_eq!(eur[0].text("Variant Price EUR"), "19.99");
        assert!(!eur[0].contains("Variant Price USD"));

        let usd = convert(rows(), "usd");
        assert_eq!(usd[0].text("Variant Price USD"), "19.99");
        assert!(!usd[0].contains("Variant Price EUR"));
    }

    #[test]
    fn test_empty_price_stays_empty() {
        let out = convert(vec![row(&[("Handle", "mug"), ("Variant Price", "")])], "EUR");
        assert!(out[0].contains("Variant Price EUR"));
        assert_eq!(out[0].text("Variant Price EUR"), "");
    }

    #[test]
    fn test_default_variant_title() {
        let out = convert(vec![row(&[("Handle", "mug")])], "EUR");
        assert_eq!(out[0].text("Variant Title"), DEFAULT_VARIANT_TITLE);
    }

    #[test]
    fn test_fixed_flags() {
        let out = convert(
            vec![row(&[("Handle", "mug")]), row(&[("Handle", "mug")])],
            "EUR",
        );

        assert_eq!(out[0].text("Product Discountable"), "TRUE");
        assert_eq!(out[1].text("Product Discountable"), "");
        for r in &out {
            assert_eq!(r.text("Variant Allow Backorder"), "FALSE");
            assert_eq!(r.text("Variant Manage Inventory"), "TRUE");
            assert_eq!(r.text("Product Id"), "");
            assert_eq!(r.text("Variant Id"), "");
        }
    }

    #[test]
    fn test_weights_and_type() {
        let out = convert(
            vec![
                row(&[("Handle", "mug"), ("Type", "Kitchen"), ("Variant Grams", "350")]),
                row(&[("Handle", "mug"), ("Type", "Other"), ("Variant Grams", "500")]),
            ],
            "EUR",
        );

        assert_eq!(out[0].text("Product Weight"), "350");
        assert_eq!(out[0].text("Product Type Id"), "Kitchen");
        assert_eq!(out[0].text("Variant Weight"), "350");
        assert_eq!(out[1].text("Product Weight"), "");
        assert_eq!(out[1].text("Product Type Id"), "");
        assert_eq!(out[1].text("Variant Weight"), "500");
    }

    #[test]
    fn test_fixed_columns_lead_in_template_order() {
        let out = convert(vec![row(&[("Handle", "mug"), ("Tags", "a")])], "EUR");
        let columns: Vec<&str> = out[0].columns().collect();

        assert_eq!(&columns[..medusa::FIXED_COLUMNS.len()], &medusa::FIXED_COLUMNS[..]);
        assert_eq!(columns[medusa::FIXED_COLUMNS.len()], "Variant Price EUR");
        assert_eq!(columns[medusa::FIXED_COLUMNS.len() + 1], "Product Tag 1");
    }

    #[test]
    fn test_markdown_description_on_parent_only() {
        let options = ConversionOptions::new("EUR").with_markdown(true);
        let out = to_medusa_records(
            vec![
                row(&[("Handle", "mug"), ("Body (HTML)", "<p><strong>Big</strong> mug</p>")]),
                row(&[("Handle", "mug"), ("Body (HTML)", "<p>other</p>")]),
            ],
            &options,
        );

        assert_eq!(out[0].text("Product Description"), "**Big** mug");
        assert_eq!(out[1].text("Product Description"), "");
    }

    #[test]
    fn test_html_kept_without_markdown_flag() {
        let out = convert(vec![row(&[("Handle", "mug"), ("Body (HTML)", "<p>Big</p>")])], "EUR");
        assert_eq!(out[0].text("Product Description"), "<p>Big</p>");
    }

    #[test]
    fn test_sales_channel_on_parent() {
        let options = ConversionOptions::new("EUR").with_sales_channel(Some(String::new()));
        let out = to_medusa_records(
            vec![row(&[("Handle", "mug")]), row(&[("Handle", "mug")])],
            &options,
        );

        assert_eq!(out[0].text("Product Sales Channel 1"), "default");
        assert_eq!(out[1].text("Product Sales Channel 1"), "");
    }

    #[test]
    fn test_custom_normalizer() {
        struct Upper;
        impl MarkupNormalizer for Upper {
            fn normalize(&self, markup: &str) -> String {
                markup.to_uppercase()
            }
        }

        let options = ConversionOptions::new("EUR").with_markdown(true);
        let groups = group_by_handle(vec![row(&[("Handle", "mug"), ("Body (HTML)", "big")])]);
        let out = ProductMapper::new(&options, &Upper).map_all(&groups);

        assert_eq!(out[0].text("Product Description"), "BIG");
    }

    #[test]
    fn test_one_output_row_per_keyed_input_row() {
        let out = convert(
            vec![
                row(&[("Handle", "a")]),
                row(&[("Handle", "")]),
                row(&[("Handle", "b")]),
                row(&[("Handle", "a")]),
            ],
            "EUR",
        );

        let handles: Vec<String> = out.iter().map(|r| r.text("Product Handle")).collect();
        assert_eq!(handles, vec!["a", "a", "b"]);
    }

    #[test]
    fn test_split_tags() {
        assert!(split_tags("").is_empty());
        assert_eq!(split_tags("a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(split_tags("solo"), vec!["solo"]);
    }
}
