//! # html2zpl
//!
//! HTML to ZPL label conversion library for Rust.
//!
//! This library lays out HTML documents (order slips, packing lists, shipping
//! labels) on a thermal label canvas and emits a single ZPL II label format.
//!
//! ## Quick Start
//!
//! ```no_run
//! use html2zpl::{convert_file, LabelConfig};
//!
//! fn main() -> html2zpl::Result<()> {
//!     // 4 inch wide label at 203 dpi, height estimated from the content
//!     let config = LabelConfig::default();
//!     let zpl = convert_file("order.html", &config)?;
//!     println!("{}", zpl);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Tables**: column widths from `<col>` hints, order-line presets or
//!   content length; `colspan`/`rowspan` handled on an occupancy grid
//! - **CSS subset**: `text-align`, `font-weight` and `width` from tag, class,
//!   id and inline declarations
//! - **No overlapping text**: every field keeps a minimum vertical distance
//! - **Barcodes**: CODE128 from a marker element's payload
//! - **Validation and repair**: structural checks on any ZPL stream
//! - **Parallel batches**: uses Rayon for many documents

pub mod error;
pub mod model;
pub mod parser;
pub mod render;
pub mod validate;

#[cfg(feature = "ffi")]
pub mod ffi;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{
    Block, Document, ElementInfo, Node, RowSection, StyleTable, Table, TableCell, TableRow,
    TableStructure, TextAlign,
};
pub use parser::{parse_html, ParseOptions};
pub use render::{
    label_canvas, Algorithm, Canvas, ColumnStrategy, ConvertResult, FontMetrics, FontRole,
    FontTable, JsonFormat, LabelConfig, RenderStats,
};
pub use validate::{repair, validate, Issue, IssueKind, RepairResult, Severity, ValidationReport};

use rayon::prelude::*;
use std::path::Path;

/// Parse HTML with the barcode marker from `config`.
pub fn parse(html: &str, config: &LabelConfig) -> Document {
    parse_html(html, &config.parse_options())
}

/// Convert an HTML document to a ZPL label.
///
/// # Arguments
///
/// * `html` - HTML source; malformed markup is accepted
/// * `config` - Label configuration
///
/// # Returns
///
/// The label format, one command group per line.
///
/// # Example
///
/// ```
/// use html2zpl::{convert, LabelConfig};
///
/// let zpl = convert("<h1>Order 42</h1>", &LabelConfig::default()).unwrap();
/// assert!(zpl.starts_with("^XA"));
/// assert!(zpl.ends_with("^XZ"));
/// ```
pub fn convert(html: &str, config: &LabelConfig) -> Result<String> {
    Ok(convert_with_report(html, config)?.content)
}

/// Convert an HTML document and return the label with its canvas,
/// validation report and statistics.
///
/// The output is validated; if validation fails and `auto_repair` is set the
/// repaired stream is returned instead.
pub fn convert_with_report(html: &str, config: &LabelConfig) -> Result<ConvertResult> {
    config.validate()?;

    let doc = parse(html, config);
    let canvas = label_canvas(&doc, config);
    let output = render::ZplRenderer::new(config, canvas, &doc.styles).render(&doc);

    let mut content = output.content;
    let mut report = validate(&content);
    let mut repaired = false;
    for issue in report.errors() {
        log::warn!("Generated label failed validation: {}", issue.message);
    }
    if !report.success && config.auto_repair {
        let fixed = repair(&content);
        content = fixed.content;
        report = validate(&content);
        repaired = true;
    }

    Ok(ConvertResult {
        content,
        canvas,
        report,
        stats: output.stats,
        repaired,
    })
}

/// Convert HTML from bytes. The input must be UTF-8; a byte order mark is
/// skipped.
///
/// # Example
///
/// ```no_run
/// use html2zpl::{convert_bytes, LabelConfig};
///
/// let data = std::fs::read("order.html").unwrap();
/// let zpl = convert_bytes(&data, &LabelConfig::default()).unwrap();
/// ```
pub fn convert_bytes(data: &[u8], config: &LabelConfig) -> Result<String> {
    let html = std::str::from_utf8(data)?;
    let html = html.strip_prefix('\u{feff}').unwrap_or(html);
    convert(html, config)
}

/// Convert an HTML file.
///
/// # Arguments
///
/// * `path` - Path to the HTML file
/// * `config` - Label configuration
pub fn convert_file<P: AsRef<Path>>(path: P, config: &LabelConfig) -> Result<String> {
    let data = std::fs::read(path)?;
    convert_bytes(&data, config)
}

/// Convert an HTML file without blocking the async runtime.
#[cfg(feature = "async")]
pub async fn convert_file_async<P: AsRef<Path>>(path: P, config: &LabelConfig) -> Result<String> {
    let data = tokio::fs::read(path).await?;
    convert_bytes(&data, config)
}

/// Convert many documents in parallel. Results keep the input order; the
/// first error is returned.
///
/// # Example
///
/// ```
/// use html2zpl::{convert_batch, LabelConfig};
///
/// let docs = ["<p>one</p>", "<p>two</p>"];
/// let labels = convert_batch(&docs, &LabelConfig::default()).unwrap();
/// assert_eq!(labels.len(), 2);
/// ```
pub fn convert_batch<S: AsRef<str> + Sync>(docs: &[S], config: &LabelConfig) -> Result<Vec<String>> {
    config.validate()?;
    docs.par_iter()
        .map(|html| convert(html.as_ref(), config))
        .collect()
}

/// Builder for converting HTML documents to labels.
///
/// # Example
///
/// ```no_run
/// use html2zpl::{ColumnStrategy, Html2Zpl};
///
/// let zpl = Html2Zpl::new()
///     .with_dpi(300)
///     .with_label_size(4.0, 6.0)
///     .with_encoding("cp852")
///     .with_column_strategy(ColumnStrategy::Structural)
///     .convert_file("order.html")?;
/// # Ok::<(), html2zpl::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Html2Zpl {
    config: LabelConfig,
}

impl Html2Zpl {
    /// Create a new builder with the default 4 inch, 203 dpi label.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration.
    pub fn from_config(config: LabelConfig) -> Self {
        Self { config }
    }

    /// Set printer resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.config = self.config.with_dpi(dpi);
        self
    }

    /// Set label width and height in inches. A height of 0 is estimated.
    pub fn with_label_size(mut self, width_in: f64, height_in: f64) -> Self {
        self.config = self.config.with_label_size(width_in, height_in);
        self
    }

    /// Set font metrics.
    pub fn with_fonts(mut self, fonts: FontTable) -> Self {
        self.config = self.config.with_fonts(fonts);
        self
    }

    /// Set the printer character encoding.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.config = self.config.with_encoding(encoding);
        self
    }

    /// Set the item count used for height estimation.
    pub fn with_item_count(mut self, count: usize) -> Self {
        self.config = self.config.with_item_count(count);
        self
    }

    /// Set the column width strategy.
    pub fn with_column_strategy(mut self, strategy: ColumnStrategy) -> Self {
        self.config = self.config.with_column_strategy(strategy);
        self
    }

    /// Set the barcode marker element id and payload attribute.
    pub fn with_barcode_marker(
        mut self,
        id: impl Into<String>,
        attribute: impl Into<String>,
    ) -> Self {
        self.config = self.config.with_barcode_marker(id, attribute);
        self
    }

    /// Set the print speed command.
    pub fn with_print_speed(mut self, speed: u8) -> Self {
        self.config = self.config.with_print_speed(speed);
        self
    }

    /// Enable or disable automatic repair of invalid output.
    pub fn with_auto_repair(mut self, repair: bool) -> Self {
        self.config = self.config.with_auto_repair(repair);
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &LabelConfig {
        &self.config
    }

    /// Convert an HTML string.
    pub fn convert(&self, html: &str) -> Result<String> {
        convert(html, &self.config)
    }

    /// Convert an HTML string and keep the report.
    pub fn convert_with_report(&self, html: &str) -> Result<ConvertResult> {
        convert_with_report(html, &self.config)
    }

    /// Convert an HTML file.
    pub fn convert_file<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        convert_file(path, &self.config)
    }
}
