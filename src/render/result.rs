//! Conversion result with validation report and statistics.

use super::canvas::Canvas;
use super::columns::Algorithm;
use crate::validate::ValidationReport;
use serde::{Deserialize, Serialize};

/// Result of converting one document, including content and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertResult {
    /// The label format (`^XA` .. `^XZ`), commands separated by `\n`
    pub content: String,

    /// Canvas the label was laid out on
    pub canvas: Canvas,

    /// Validation of the final content
    pub report: ValidationReport,

    /// Rendering statistics
    pub stats: RenderStats,

    /// Whether the content was repaired after rendering
    pub repaired: bool,
}

impl ConvertResult {
    /// Get the content length in bytes.
    pub fn content_len(&self) -> usize {
        self.content.len()
    }

    /// Whether the final content passed validation.
    pub fn is_valid(&self) -> bool {
        self.report.success
    }
}

/// Statistics collected while rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStats {
    /// Number of text fields emitted
    pub text_fields: u32,

    /// Text fields whose resolved style is bold
    pub bold_fields: u32,

    /// Number of tables rendered
    pub tables: u32,

    /// Number of table rows rendered
    pub table_rows: u32,

    /// Number of horizontal rules
    pub rules: u32,

    /// Whether a barcode field was emitted
    pub barcode: bool,

    /// Cursor position after the last element
    pub final_y: u32,

    /// Column strategy used for each table, in document order
    pub algorithms: Vec<Algorithm>,
}

impl RenderStats {
    /// Create new empty statistics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge another stats instance into this one.
    pub fn merge(&mut self, other: &RenderStats) {
        self.text_fields += other.text_fields;
        self.bold_fields += other.bold_fields;
        self.tables += other.tables;
        self.table_rows += other.table_rows;
        self.rules += other.rules;
        self.barcode |= other.barcode;
        self.final_y = self.final_y.max(other.final_y);
        self.algorithms.extend_from_slice(&other.algorithms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_merge() {
        let mut a = RenderStats {
            text_fields: 3,
            tables: 1,
            final_y: 400,
            algorithms: vec![Algorithm::Structural],
            ..Default::default()
        };
        let b = RenderStats {
            text_fields: 2,
            rules: 4,
            barcode: true,
            final_y: 300,
            algorithms: vec![Algorithm::ContentWeighted],
            ..Default::default()
        };
        a.merge(&b);
        assert_eq!(a.text_fields, 5);
        assert_eq!(a.rules, 4);
        assert!(a.barcode);
        assert_eq!(a.final_y, 400);
        assert_eq!(a.algorithms.len(), 2);
    }

    #[test]
    fn test_stats_serialize() {
        let stats = RenderStats {
            tables: 1,
            algorithms: vec![Algorithm::ExplicitHints],
            ..RenderStats::new()
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"tables\":1"));
        assert!(json.contains("\"explicit_hints\""));
    }
}
