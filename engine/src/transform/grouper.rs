//! Group flat export rows into products.
//!
//! Shopify writes one row per variant (and per extra image). Rows of one
//! product share a `Handle`; the first row carries the product fields.
//!
//! ```text
//! Export rows (flat)              →  Product groups
//! ┌──────────────────────────┐       ┌──────────────────────────┐
//! │ Handle: shirt, Size: S   │       │ shirt: [S row, L row]    │
//! │ Handle: mug              │  →    ├──────────────────────────┤
//! │ Handle: shirt, Size: L   │       │ mug:   [mug row]         │
//! │ Handle: (empty)          │       └──────────────────────────┘
//! └──────────────────────────┘         (stray row dropped)
//! ```
//!
//! Groups come out in order of first appearance, rows within a group in
//! file order.

use indexmap::IndexMap;

use crate::models::{ProductGroup, SourceRecord};

/// Partition rows by handle. Rows with an empty handle are dropped.
pub fn group_by_handle(records: Vec<SourceRecord>) -> Vec<ProductGroup> {
    let mut groups: IndexMap<String, Vec<SourceRecord>> = IndexMap::new();

    for record in records {
        let handle = record.handle();
        if handle.is_empty() {
            continue;
        }
        groups.entry(handle.to_string()).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(handle, rows)| ProductGroup { handle, rows })
        .collect()
}
