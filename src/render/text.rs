//! Text fields and vertical overlap avoidance.

use super::canvas::Canvas;
use super::fonts::FontMetrics;
use crate::model::TextAlign;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

/// Minimum vertical gap between two text fields, in dots.
pub const MIN_LINE_SPACING: u32 = 10;

/// Vertical offsets already used by text fields in one conversion.
///
/// Any two registered positions differ by at least the line spacing plus the
/// font height of the later field.
#[derive(Debug, Clone)]
pub struct YPositionRegistry {
    positions: Vec<u32>,
    spacing: u32,
}

impl YPositionRegistry {
    /// Create an empty registry with the default line spacing.
    pub fn new() -> Self {
        Self::with_spacing(MIN_LINE_SPACING)
    }

    /// Create an empty registry with a custom line spacing.
    pub fn with_spacing(spacing: u32) -> Self {
        Self {
            positions: Vec::new(),
            spacing,
        }
    }

    /// Find the first free position at or below `candidate` and register it.
    ///
    /// While a registered position lies closer than `font_height + spacing`,
    /// the candidate moves down by that same distance, stopping at
    /// `u32::MAX`.
    pub fn claim(&mut self, candidate: u32, font_height: u32) -> u32 {
        let step = font_height.saturating_add(self.spacing);
        let mut y = candidate;
        while y < u32::MAX && self.positions.iter().any(|p| p.abs_diff(y) < step) {
            y = y.saturating_add(step);
        }
        let at = self.positions.partition_point(|p| *p < y);
        self.positions.insert(at, y);
        y
    }

    /// Whether every registered position is at least `distance` above `y`.
    pub fn is_clear_above(&self, y: u32, distance: u32) -> bool {
        self.positions
            .last()
            .map_or(true, |last| y >= last.saturating_add(distance))
    }

    /// Lowest registered position.
    pub fn max(&self) -> Option<u32> {
        self.positions.last().copied()
    }

    /// Registered positions in ascending order.
    pub fn positions(&self) -> &[u32] {
        &self.positions
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Forget every position.
    pub fn clear(&mut self) {
        self.positions.clear();
    }
}

impl Default for YPositionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalize text for a field: NFC, control characters removed, line breaks
/// and tabs turned into spaces, whitespace runs collapsed.
pub fn clean_text(text: &str) -> String {
    let normalized: String = text
        .nfc()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| !c.is_control())
        .collect();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Field data with the command prefixes escaped.
///
/// Returns the data and whether it needs the `^FH` hex indicator. When it
/// does, `_` itself is also escaped since it becomes the escape character.
pub fn encode_field_data(text: &str) -> (String, bool) {
    if !text.contains(['^', '~']) {
        return (text.to_string(), false);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '^' => out.push_str("_5E"),
            '~' => out.push_str("_7E"),
            '_' => out.push_str("_5F"),
            c => out.push(c),
        }
    }
    (out, true)
}

/// One positioned text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub x: u32,
    pub y: u32,
    pub font: FontMetrics,
    pub width: u32,
    pub lines: u32,
    pub align: TextAlign,
    /// Cleaned text, before escaping
    pub text: String,
}

impl TextField {
    /// Y just below the field's estimated last line.
    pub fn bottom(&self) -> u32 {
        self.y
            .saturating_add(self.lines.saturating_mul(self.font.height))
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (data, hex) = encode_field_data(&self.text);
        write!(
            f,
            "^FO{},{}^A0N,{},{}^FB{},{},0,{}{}^FD{}^FS",
            self.x,
            self.y,
            self.font.height,
            self.font.width,
            self.width,
            self.lines,
            self.align.code(),
            if hex { "^FH" } else { "" },
            data
        )
    }
}

/// Estimated line count for `chars` characters in a field `width` dots wide.
pub fn estimate_lines(chars: usize, width: u32, font: FontMetrics) -> u32 {
    let per_line = (width / font.width.max(1)).max(1) as usize;
    chars.div_ceil(per_line).max(1) as u32
}

/// Lay out one text field.
///
/// Returns the field (`None` for blank text) and the y below it. A `width`
/// of 0 extends the field to the right margin.
#[allow(clippy::too_many_arguments)]
pub fn render_text(
    registry: &mut YPositionRegistry,
    canvas: &Canvas,
    text: &str,
    x: u32,
    y: u32,
    font: FontMetrics,
    width: u32,
    align: TextAlign,
) -> (Option<TextField>, u32) {
    let text = clean_text(text);
    if text.is_empty() {
        return (None, y);
    }

    let width = if width == 0 { canvas.width_from(x) } else { width };
    let safe_y = registry.claim(y, font.height);
    let field = TextField {
        x,
        y: safe_y,
        font,
        width,
        lines: estimate_lines(text.chars().count(), width, font),
        align,
        text,
    };
    let new_y = field.bottom();
    (Some(field), new_y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const NORMAL: FontMetrics = FontMetrics::new(25, 25);

    #[test]
    fn test_registry_spacing() {
        let mut registry = YPositionRegistry::new();
        assert_eq!(registry.claim(100, 25), 100);
        // 110 is within 35 of 100, so it moves down by 35
        assert_eq!(registry.claim(110, 25), 145);
        // 135 and 170 are both too close to a claimed position
        assert_eq!(registry.claim(100, 25), 205);
        assert_eq!(registry.positions(), &[100, 145, 205]);
        assert_eq!(registry.max(), Some(205));
    }

    #[test]
    fn test_registry_saturates_at_bottom() {
        let mut registry = YPositionRegistry::new();
        let huge = u32::MAX / 2;
        assert_eq!(registry.claim(0, huge), 0);
        assert_eq!(registry.claim(0, huge), huge + 10);
        // no room left below, the position pins to the last dot
        assert_eq!(registry.claim(0, huge), u32::MAX);
        assert_eq!(registry.claim(0, huge), u32::MAX);
    }

    #[test]
    fn test_registry_clear_above() {
        let mut registry = YPositionRegistry::new();
        assert!(registry.is_clear_above(0, 50));
        registry.claim(100, 25);
        assert!(!registry.is_clear_above(149, 50));
        assert!(registry.is_clear_above(150, 50));
        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Order\n\t 42\u{0007} "), "Order 42");
        // Decomposed e + combining acute becomes a single code point
        assert_eq!(clean_text("Cafe\u{0301}"), "Caf\u{e9}");
    }

    #[test]
    fn test_encode_field_data() {
        assert_eq!(encode_field_data("plain_text"), ("plain_text".to_string(), false));
        assert_eq!(
            encode_field_data("a^b~c_d"),
            ("a_5Eb_7Ec_5Fd".to_string(), true)
        );
    }

    #[test]
    fn test_estimate_lines() {
        assert_eq!(estimate_lines(10, 250, NORMAL), 1);
        assert_eq!(estimate_lines(11, 250, NORMAL), 2);
        assert_eq!(estimate_lines(0, 250, NORMAL), 1);
        // Narrower than one glyph still fits one character per line
        assert_eq!(estimate_lines(3, 5, NORMAL), 3);
    }

    #[test]
    fn test_render_text_command() {
        let canvas = Canvas::new(812, 1000, 203);
        let mut registry = YPositionRegistry::new();
        let (field, new_y) = render_text(
            &mut registry,
            &canvas,
            "Order 42",
            20,
            20,
            NORMAL,
            772,
            TextAlign::Center,
        );
        let field = field.unwrap();
        assert_eq!(
            field.to_string(),
            "^FO20,20^A0N,25,25^FB772,1,0,C^FDOrder 42^FS"
        );
        assert_eq!(new_y, 45);
    }

    #[test]
    fn test_render_text_escapes_and_defaults_width() {
        let canvas = Canvas::new(812, 1000, 203);
        let mut registry = YPositionRegistry::new();
        let (field, _) = render_text(
            &mut registry,
            &canvas,
            "^XZ",
            100,
            0,
            NORMAL,
            0,
            TextAlign::Left,
        );
        let command = field.unwrap().to_string();
        assert_eq!(command, "^FO100,0^A0N,25,25^FB692,1,0,L^FH^FD_5EXZ^FS");
    }

    #[test]
    fn test_render_blank_text() {
        let canvas = Canvas::new(812, 1000, 203);
        let mut registry = YPositionRegistry::new();
        let (field, new_y) =
            render_text(&mut registry, &canvas, " \n ", 20, 77, NORMAL, 0, TextAlign::Left);
        assert!(field.is_none());
        assert_eq!(new_y, 77);
        assert!(registry.is_empty());
    }
}
