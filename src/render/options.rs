//! Label configuration.

use super::canvas::{inches_to_dots, Canvas};
use super::fonts::{FontTable, MAX_FONT_DOTS};
use crate::error::{Error, Result};
use crate::parser::ParseOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How table column widths are chosen when no complete `<col>` hints exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnStrategy {
    /// Preset layout for order-line tables, content weighting otherwise
    #[default]
    Auto,
    /// Always use the preset layout
    Structural,
    /// Always weight widths by cell content length
    ContentWeighted,
}

/// Printer and label settings for one conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelConfig {
    /// Printer resolution in dots per inch
    pub dpi: u32,

    /// Label width in inches
    pub label_width_in: f64,

    /// Label height in inches (0 = estimate from content)
    pub label_height_in: f64,

    /// Font metrics per role
    pub fonts: FontTable,

    /// Output character set name (`utf8`, `cp850`, ...)
    pub encoding: String,

    /// Known number of order lines, used when estimating height
    pub item_count: Option<usize>,

    /// Column width strategy
    pub column_strategy: ColumnStrategy,

    /// `id` of the barcode marker element
    pub barcode_id: String,

    /// Attribute holding the barcode payload
    pub barcode_attribute: String,

    /// Print speed command value (`^PR`), omitted when `None`
    pub print_speed: Option<u8>,

    /// Repair the output when validation reports errors
    pub auto_repair: bool,
}

impl LabelConfig {
    /// Create a configuration with defaults (4 inch label at 203 dpi).
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file. Missing keys take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the printer resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Set the label width and height in inches. A height of 0 means auto.
    pub fn with_label_size(mut self, width_in: f64, height_in: f64) -> Self {
        self.label_width_in = width_in;
        self.label_height_in = height_in;
        self
    }

    /// Set the label width in inches.
    pub fn with_width(mut self, width_in: f64) -> Self {
        self.label_width_in = width_in;
        self
    }

    /// Set the label height in inches.
    pub fn with_height(mut self, height_in: f64) -> Self {
        self.label_height_in = height_in;
        self
    }

    /// Set the font table.
    pub fn with_fonts(mut self, fonts: FontTable) -> Self {
        self.fonts = fonts;
        self
    }

    /// Set the output encoding name.
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Set the known item count.
    pub fn with_item_count(mut self, count: usize) -> Self {
        self.item_count = Some(count);
        self
    }

    /// Set the column strategy.
    pub fn with_column_strategy(mut self, strategy: ColumnStrategy) -> Self {
        self.column_strategy = strategy;
        self
    }

    /// Set the barcode marker id and payload attribute.
    pub fn with_barcode_marker(mut self, id: impl Into<String>, attribute: impl Into<String>) -> Self {
        self.barcode_id = id.into();
        self.barcode_attribute = attribute.into();
        self
    }

    /// Set the print speed.
    pub fn with_print_speed(mut self, speed: u8) -> Self {
        self.print_speed = Some(speed);
        self
    }

    /// Enable or disable automatic repair.
    pub fn with_auto_repair(mut self, repair: bool) -> Self {
        self.auto_repair = repair;
        self
    }

    /// Check the canvas invariants.
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(Error::InvalidConfig("dpi must be positive".to_string()));
        }
        if !self.label_width_in.is_finite() || self.label_width_in <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "label width must be positive, got {}",
                self.label_width_in
            )));
        }
        if inches_to_dots(self.label_width_in, self.dpi) == 0 {
            return Err(Error::InvalidConfig(
                "label width is narrower than one dot".to_string(),
            ));
        }
        if !self.label_height_in.is_finite() || self.label_height_in < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "label height must not be negative, got {}",
                self.label_height_in
            )));
        }
        if !self.fonts.is_valid() {
            return Err(Error::InvalidConfig(format!(
                "font metrics must be between 1 and {} dots",
                MAX_FONT_DOTS
            )));
        }
        Ok(())
    }

    /// Label width in dots.
    pub fn width_dots(&self) -> u32 {
        inches_to_dots(self.label_width_in, self.dpi)
    }

    /// Explicit label height in dots, if one is configured.
    pub fn explicit_height_dots(&self) -> Option<u32> {
        (self.label_height_in > 0.0).then(|| inches_to_dots(self.label_height_in, self.dpi))
    }

    /// Canvas for a given height.
    pub fn canvas(&self, height_dots: u32) -> Canvas {
        Canvas::new(self.width_dots(), height_dots, self.dpi)
    }

    /// Parser options derived from this configuration.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::new()
            .with_barcode_id(self.barcode_id.clone())
            .with_barcode_attribute(self.barcode_attribute.clone())
    }
}

impl Default for LabelConfig {
    fn default() -> Self {
        Self {
            dpi: 203,
            label_width_in: 4.0,
            label_height_in: 0.0,
            fonts: FontTable::default(),
            encoding: "utf8".to_string(),
            item_count: None,
            column_strategy: ColumnStrategy::Auto,
            barcode_id: "barcode".to_string(),
            barcode_attribute: "data-barcode".to_string(),
            print_speed: None,
            auto_repair: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::fonts::FontMetrics;

    #[test]
    fn test_defaults() {
        let config = LabelConfig::default();
        assert_eq!(config.dpi, 203);
        assert_eq!(config.width_dots(), 812);
        assert!(config.explicit_height_dots().is_none());
        assert!(config.auto_repair);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = LabelConfig::new()
            .with_dpi(300)
            .with_label_size(4.0, 6.0)
            .with_encoding("cp850")
            .with_print_speed(2)
            .with_column_strategy(ColumnStrategy::ContentWeighted);
        assert_eq!(config.width_dots(), 1200);
        assert_eq!(config.explicit_height_dots(), Some(1800));
        assert_eq!(config.print_speed, Some(2));
        assert_eq!(config.canvas(1800).margin_dots, 30);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            LabelConfig::new().with_dpi(0).validate(),
            Err(Error::InvalidConfig(_))
        ));
        assert!(LabelConfig::new().with_width(0.0).validate().is_err());
        assert!(LabelConfig::new().with_width(f64::NAN).validate().is_err());
        assert!(LabelConfig::new().with_height(-1.0).validate().is_err());

        let mut fonts = FontTable::default();
        fonts.normal = FontMetrics::new(25, u32::MAX / 2);
        assert!(matches!(
            LabelConfig::new().with_fonts(fonts).validate(),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            LabelConfig::from_json_str(r#"{"dpi": 300, "column_strategy": "structural"}"#).unwrap();
        assert_eq!(config.dpi, 300);
        assert_eq!(config.column_strategy, ColumnStrategy::Structural);
        assert_eq!(config.encoding, "utf8");
    }

    #[test]
    fn test_from_json_rejects_invalid() {
        assert!(matches!(
            LabelConfig::from_json_str("{not json"),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            LabelConfig::from_json_str(r#"{"dpi": 0}"#),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_parse_options_follow_marker() {
        let options = LabelConfig::new()
            .with_barcode_marker("ean", "data-ean")
            .parse_options();
        assert_eq!(options.barcode_id, "ean");
        assert_eq!(options.barcode_attribute, "data-ean");
    }
}
