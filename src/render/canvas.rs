//! Label canvas geometry and unit conversion.

use serde::{Deserialize, Serialize};

pub const MM_PER_INCH: f64 = 25.4;

/// Convert millimetres to dots, truncating.
pub fn mm_to_dots(mm: f64, dpi: u32) -> u32 {
    (mm / MM_PER_INCH * f64::from(dpi)).max(0.0) as u32
}

/// Convert inches to dots, truncating.
pub fn inches_to_dots(inches: f64, dpi: u32) -> u32 {
    (inches * f64::from(dpi)).max(0.0) as u32
}

/// Convert dots back to millimetres.
pub fn dots_to_mm(dots: u32, dpi: u32) -> f64 {
    if dpi == 0 {
        return 0.0;
    }
    f64::from(dots) / f64::from(dpi) * MM_PER_INCH
}

/// The printable area of one label, in dots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width_dots: u32,
    pub height_dots: u32,
    pub dpi: u32,
    pub margin_dots: u32,
}

impl Canvas {
    /// Create a canvas; the margin is a tenth of an inch.
    pub fn new(width_dots: u32, height_dots: u32, dpi: u32) -> Self {
        Self {
            width_dots,
            height_dots,
            dpi,
            margin_dots: dpi / 10,
        }
    }

    /// Width between the left and right margins.
    pub fn usable_width(&self) -> u32 {
        self.width_dots.saturating_sub(2 * self.margin_dots)
    }

    /// Width from `x` to the right margin.
    pub fn width_from(&self, x: u32) -> u32 {
        self.width_dots
            .saturating_sub(x)
            .saturating_sub(self.margin_dots)
    }
}
