//! Rendering module for laying out documents as ZPL labels.

mod canvas;
pub mod columns;
pub mod dimensions;
mod fonts;
pub mod grid;
mod json;
mod options;
mod renderer;
mod result;
mod table;
pub mod text;
pub mod zpl;

pub use canvas::{dots_to_mm, inches_to_dots, mm_to_dots, Canvas, MM_PER_INCH};
pub use columns::{allocate, Algorithm, ColumnLayout};
pub use dimensions::{count_items, estimate_height, ItemCountSource, ItemEstimate};
pub use fonts::{FontMetrics, FontRole, FontTable, DEFAULT_FONTS, MAX_FONT_DOTS};
pub use json::{to_json, JsonFormat};
pub use options::{ColumnStrategy, LabelConfig};
pub use renderer::{RenderOutput, ZplRenderer};
pub use result::{ConvertResult, RenderStats};
pub use text::{YPositionRegistry, MIN_LINE_SPACING};

use crate::model::Document;

/// Canvas for a document: the configured height, or an estimate from its
/// content when no height is set.
pub fn label_canvas(doc: &Document, config: &LabelConfig) -> Canvas {
    let height = config
        .explicit_height_dots()
        .unwrap_or_else(|| estimate_height(doc, config.dpi, config.item_count));
    config.canvas(height)
}
