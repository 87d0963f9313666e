//! Transformation module.
//!
//! This module handles Shopify to Medusa conversion:
//! - Grouper: Flat export rows to product groups
//! - Medusa: Product groups to import rows
//! - Pipeline: Decode, transform, encode and summarize

pub mod grouper;
pub mod medusa;
pub mod pipeline;

pub use grouper::group_by_handle;
pub use medusa::{split_tags, status, to_medusa_records, ProductMapper, DEFAULT_VARIANT_TITLE};
pub use pipeline::*;
