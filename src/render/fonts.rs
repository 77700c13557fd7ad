//! Font roles and their scalable-font metrics, in dots.

use serde::{Deserialize, Serialize};

/// What a piece of text is, typographically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontRole {
    Header,
    Subheader,
    Normal,
    Small,
    TableHeader,
    TableCell,
}

impl FontRole {
    /// Role for a heading level.
    pub fn for_heading(level: u8) -> Self {
        match level {
            1 => FontRole::Header,
            2 => FontRole::Subheader,
            3 | 4 => FontRole::Normal,
            _ => FontRole::Small,
        }
    }
}

/// Largest character height or width `^A` accepts.
pub const MAX_FONT_DOTS: u32 = 32000;

/// Character cell size of the built-in scalable font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontMetrics {
    pub width: u32,
    pub height: u32,
}

impl FontMetrics {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Metrics for every role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontTable {
    pub header: FontMetrics,
    pub subheader: FontMetrics,
    pub normal: FontMetrics,
    pub small: FontMetrics,
    pub table_header: FontMetrics,
    pub table_cell: FontMetrics,
}

/// The stock table used when a configuration does not override it.
pub const DEFAULT_FONTS: FontTable = FontTable {
    header: FontMetrics::new(40, 40),
    subheader: FontMetrics::new(30, 30),
    normal: FontMetrics::new(25, 25),
    small: FontMetrics::new(20, 20),
    table_header: FontMetrics::new(20, 20),
    table_cell: FontMetrics::new(25, 25),
};

impl FontTable {
    /// Metrics for a role.
    pub fn get(&self, role: FontRole) -> FontMetrics {
        match role {
            FontRole::Header => self.header,
            FontRole::Subheader => self.subheader,
            FontRole::Normal => self.normal,
            FontRole::Small => self.small,
            FontRole::TableHeader => self.table_header,
            FontRole::TableCell => self.table_cell,
        }
    }

    /// Tallest font height used inside tables.
    pub fn table_line_height(&self) -> u32 {
        self.table_cell.height.max(self.table_header.height)
    }

    /// Tallest font height of any role.
    pub fn max_height(&self) -> u32 {
        [
            self.header,
            self.subheader,
            self.normal,
            self.small,
            self.table_header,
            self.table_cell,
        ]
        .iter()
        .map(|m| m.height)
        .max()
        .unwrap_or(0)
    }

    /// Check that every metric is between 1 and [`MAX_FONT_DOTS`].
    pub fn is_valid(&self) -> bool {
        [
            self.header,
            self.subheader,
            self.normal,
            self.small,
            self.table_header,
            self.table_cell,
        ]
        .iter()
        .all(|m| (1..=MAX_FONT_DOTS).contains(&m.width) && (1..=MAX_FONT_DOTS).contains(&m.height))
    }
}

impl Default for FontTable {
    fn default() -> Self {
        DEFAULT_FONTS
    }
}
