//! Label height estimation.
//!
//! When no height is configured, the label is sized from the number of order
//! lines: a fixed header band, a fixed band per item and a footer band, plus
//! a 5 % safety margin.

use super::canvas::mm_to_dots;
use crate::model::Document;
use serde::{Deserialize, Serialize};

pub const HEADER_MM: f64 = 50.0;
pub const ITEM_MM: f64 = 15.0;
pub const FOOTER_MM: f64 = 20.0;
pub const SAFETY_FACTOR: f64 = 1.05;
pub const DEFAULT_ITEM_COUNT: usize = 10;

/// Row class marking one order line.
pub const ITEM_ROW_CLASS: &str = "item-name";

/// Where an item count came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCountSource {
    Configured,
    ItemRows,
    BodyRows,
    Default,
}

/// An item count and its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEstimate {
    pub count: usize,
    pub source: ItemCountSource,
}

/// Determine the item count: explicit value, then `item-name` rows, then
/// body rows of every table, then the default.
pub fn count_items(doc: &Document, explicit: Option<usize>) -> ItemEstimate {
    if let Some(count) = explicit {
        return ItemEstimate {
            count,
            source: ItemCountSource::Configured,
        };
    }

    let tables = doc.tables();
    let item_rows = tables
        .iter()
        .flat_map(|t| &t.rows)
        .filter(|r| r.info.has_class(ITEM_ROW_CLASS))
        .count();
    if item_rows > 0 {
        return ItemEstimate {
            count: item_rows,
            source: ItemCountSource::ItemRows,
        };
    }

    let body_rows: usize = tables.iter().map(|t| t.body_rows().count()).sum();
    if body_rows > 0 {
        return ItemEstimate {
            count: body_rows,
            source: ItemCountSource::BodyRows,
        };
    }

    ItemEstimate {
        count: DEFAULT_ITEM_COUNT,
        source: ItemCountSource::Default,
    }
}

/// Estimated label length in millimetres for an item count.
pub fn estimated_mm(items: usize) -> f64 {
    (HEADER_MM + items as f64 * ITEM_MM + FOOTER_MM) * SAFETY_FACTOR
}

/// Estimate the canvas height in dots.
pub fn estimate_height(doc: &Document, dpi: u32, item_count: Option<usize>) -> u32 {
    let items = count_items(doc, item_count);
    let height = mm_to_dots(estimated_mm(items.count), dpi);
    log::debug!(
        "Estimated label height {} dots from {} items ({:?})",
        height,
        items.count,
        items.source
    );
    height
}
