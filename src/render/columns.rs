//! Column width allocation.
//!
//! Three strategies, tried in order:
//!
//! 1. **Explicit hints**: every column carries a `<col>` percentage.
//! 2. **Structural**: the order-line layout. A narrow ordinal column followed
//!    by a preset split for 5, 6 and 7 column tables, an even split otherwise.
//! 3. **Content weighted**: widths proportional to the longest cell text per
//!    column, with a floor per column and a cap for long unbreakable text.

use super::fonts::FontTable;
use super::grid::OccupancyGrid;
use super::options::ColumnStrategy;
use crate::model::{looks_numeric, Table};
use serde::{Deserialize, Serialize};

/// Share of the usable width given to the ordinal first column.
pub const ORDINAL_COLUMN_PERCENT: f64 = 8.0;

/// Percent splits of the remaining 92 % by column count.
const STRUCTURAL_PRESETS: &[(usize, &[f64])] = &[
    (5, &[38.0, 18.0, 18.0, 18.0]),
    (6, &[32.0, 15.0, 15.0, 15.0, 15.0]),
    (7, &[30.0, 12.0, 13.0, 12.0, 13.0, 12.0]),
];

/// Header labels of an ordinal column.
const ORDINAL_HEADERS: &[&str] = &["lp", "no", "nr", "#", "pos"];

/// Cell text containing a line break counts this much longer.
const LINE_BREAK_WEIGHT: f64 = 1.5;
/// Share of the usable width split evenly as a per-column floor.
const FLOOR_SHARE: f64 = 0.1;
/// Average glyph advance relative to the cell font width.
const GLYPH_ADVANCE: f64 = 0.6;
/// Widest a single column may grow to fit its text.
const MAX_COLUMN_SHARE: f64 = 0.4;

/// Which strategy produced a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    ExplicitHints,
    Structural,
    ContentWeighted,
}

/// Column widths for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    pub widths: Vec<u32>,
    pub algorithm: Algorithm,
}

impl ColumnLayout {
    /// X offset of each column relative to the table origin.
    pub fn offsets(&self) -> Vec<u32> {
        let mut x = 0;
        self.widths
            .iter()
            .map(|w| {
                let start = x;
                x += w;
                start
            })
            .collect()
    }

    /// Combined width of `span` columns starting at `col`.
    pub fn span_width(&self, col: usize, span: usize) -> u32 {
        self.widths.iter().skip(col).take(span).sum()
    }

    pub fn total(&self) -> u32 {
        self.widths.iter().sum()
    }
}

/// Choose the strategy for a table.
pub fn choose_algorithm(table: &Table, columns: usize, strategy: ColumnStrategy) -> Algorithm {
    if complete_hints(table, columns).is_some() {
        return Algorithm::ExplicitHints;
    }
    match strategy {
        ColumnStrategy::Structural => Algorithm::Structural,
        ColumnStrategy::ContentWeighted => Algorithm::ContentWeighted,
        ColumnStrategy::Auto => {
            let preset = STRUCTURAL_PRESETS.iter().any(|(n, _)| *n == columns);
            if preset || (columns >= 3 && has_ordinal_column(table)) {
                Algorithm::Structural
            } else {
                Algorithm::ContentWeighted
            }
        }
    }
}

/// Allocate widths for every grid column of `table` within `usable` dots.
pub fn allocate(
    table: &Table,
    usable: u32,
    strategy: ColumnStrategy,
    fonts: &FontTable,
) -> ColumnLayout {
    let grid = OccupancyGrid::build(table);
    allocate_with_grid(table, &grid, usable, strategy, fonts)
}

/// [`allocate`] with a prebuilt grid.
pub fn allocate_with_grid(
    table: &Table,
    grid: &OccupancyGrid,
    usable: u32,
    strategy: ColumnStrategy,
    fonts: &FontTable,
) -> ColumnLayout {
    let columns = grid.columns();
    let algorithm = choose_algorithm(table, columns, strategy);
    let widths = match algorithm {
        Algorithm::ExplicitHints => match complete_hints(table, columns) {
            Some(hints) => explicit_widths(&hints, usable),
            None => structural_widths(columns, usable),
        },
        Algorithm::Structural => structural_widths(columns, usable),
        Algorithm::ContentWeighted => content_widths(table, grid, usable, fonts),
    };
    log::debug!(
        "Table with {} columns laid out by {:?}: {:?}",
        columns,
        algorithm,
        widths
    );
    ColumnLayout { widths, algorithm }
}

fn complete_hints(table: &Table, columns: usize) -> Option<Vec<f32>> {
    table.complete_hints().filter(|h| h.len() == columns)
}

/// Widths from percentages. Percentages summing past 100 are scaled down so
/// the table still fits.
pub fn explicit_widths(percentages: &[f32], usable: u32) -> Vec<u32> {
    let sum: f64 = percentages.iter().map(|p| f64::from(*p)).sum();
    let scale = if sum > 100.0 { 100.0 / sum } else { 1.0 };
    percentages
        .iter()
        .map(|p| percent_of(f64::from(*p) * scale, usable))
        .collect()
}

/// The order-line layout.
pub fn structural_widths(columns: usize, usable: u32) -> Vec<u32> {
    match columns {
        0 => Vec::new(),
        1 => vec![usable],
        n => {
            let mut widths = Vec::with_capacity(n);
            widths.push(percent_of(ORDINAL_COLUMN_PERCENT, usable));
            let rest = 100.0 - ORDINAL_COLUMN_PERCENT;
            match STRUCTURAL_PRESETS.iter().find(|(count, _)| *count == n) {
                Some((_, preset)) => {
                    widths.extend(preset.iter().map(|p| percent_of(*p, usable)));
                }
                None => {
                    let each = rest / (n - 1) as f64;
                    widths.extend((1..n).map(|_| percent_of(each, usable)));
                }
            }
            widths
        }
    }
}

/// Widths weighted by content length.
pub fn content_widths(
    table: &Table,
    grid: &OccupancyGrid,
    usable: u32,
    fonts: &FontTable,
) -> Vec<u32> {
    let n = grid.columns();
    if n == 0 {
        return Vec::new();
    }

    let lengths = content_lengths(table, grid);
    let total: f64 = lengths.iter().sum();
    let u = f64::from(usable);

    let mut widths: Vec<u32> = if total <= 0.0 {
        vec![usable / n as u32; n]
    } else {
        let floor = u * FLOOR_SHARE / n as f64;
        let char_width = f64::from(fonts.table_cell.width) * GLYPH_ADVANCE;
        let cap = (u * MAX_COLUMN_SHARE) as u32;
        lengths
            .iter()
            .map(|len| {
                let w = (floor + len * u * (1.0 - FLOOR_SHARE) / total) as u32;
                let text_width = (len * char_width) as u32;
                if text_width > w {
                    text_width.min(cap)
                } else {
                    w
                }
            })
            .collect()
    };

    shrink_to_fit(&mut widths, usable);
    widths
}

/// Longest cell text per column. Spanning cells are left out.
fn content_lengths(table: &Table, grid: &OccupancyGrid) -> Vec<f64> {
    let mut lengths = vec![0.0f64; grid.columns()];
    for (r, row) in table.rows.iter().enumerate() {
        for slot in grid.slots(r) {
            if slot.colspan != 1 {
                continue;
            }
            let cell = &row.cells[slot.cell];
            let mut len = cell.text.replace('\n', " ").trim().chars().count() as f64;
            if cell.has_line_break {
                len *= LINE_BREAK_WEIGHT;
            }
            if let Some(max) = lengths.get_mut(slot.column) {
                *max = max.max(len);
            }
        }
    }
    lengths
}

/// Take one dot at a time from the widest column (lowest index on ties)
/// until the total fits.
fn shrink_to_fit(widths: &mut [u32], usable: u32) {
    let mut total: u64 = widths.iter().map(|w| u64::from(*w)).sum();
    while total > u64::from(usable) {
        let mut widest = 0;
        for (i, w) in widths.iter().enumerate() {
            if *w > widths[widest] {
                widest = i;
            }
        }
        if widths[widest] == 0 {
            break;
        }
        widths[widest] -= 1;
        total -= 1;
    }
}

/// Whether the first column holds ordinal numbers.
fn has_ordinal_column(table: &Table) -> bool {
    let header = table
        .rows
        .iter()
        .filter(|r| !r.is_body())
        .find_map(|r| r.cells.first());
    if let Some(cell) = header {
        let label = cell.text.trim().trim_end_matches('.').to_lowercase();
        if ORDINAL_HEADERS.contains(&label.as_str()) {
            return true;
        }
    }

    let mut seen = false;
    for row in table.body_rows() {
        let Some(cell) = row.cells.first().filter(|c| c.colspan == 1) else {
            continue;
        };
        let text = cell.text.trim().trim_end_matches('.');
        if text.is_empty() {
            continue;
        }
        if !text.chars().all(|c| c.is_ascii_digit()) {
            return false;
        }
        seen = true;
    }
    seen
}

/// Per grid column: every non-empty body cell looks numeric.
pub fn numeric_columns(table: &Table, grid: &OccupancyGrid) -> Vec<bool> {
    let mut seen = vec![false; grid.columns()];
    let mut numeric = vec![true; grid.columns()];
    for (r, row) in table.rows.iter().enumerate() {
        if !row.is_body() {
            continue;
        }
        for slot in grid.slots(r) {
            let cell = &row.cells[slot.cell];
            if cell.is_empty() || slot.colspan != 1 {
                continue;
            }
            if let (Some(s), Some(n)) = (seen.get_mut(slot.column), numeric.get_mut(slot.column)) {
                *s = true;
                *n &= looks_numeric(&cell.text);
            }
        }
    }
    seen.iter().zip(numeric).map(|(s, n)| *s && n).collect()
}

fn percent_of(percent: f64, usable: u32) -> u32 {
    (f64::from(usable) * percent / 100.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TableCell, TableRow};
    use crate::render::fonts::DEFAULT_FONTS;

    fn table_of(rows: &[&[&str]]) -> Table {
        let mut table = Table::default();
        for row in rows {
            table.add_row(TableRow::from_strings(row.iter().copied()));
        }
        table
    }

    #[test]
    fn test_structural_five_columns() {
        let table = table_of(&[&["1", "Widget", "2", "10.00", "20.00"]]);
        let layout = allocate(&table, 800, ColumnStrategy::Auto, &DEFAULT_FONTS);
        assert_eq!(layout.algorithm, Algorithm::Structural);
        assert_eq!(layout.widths, vec![64, 304, 144, 144, 144]);
        assert_eq!(layout.offsets(), vec![0, 64, 368, 512, 656]);
    }

    #[test]
    fn test_structural_presets() {
        assert_eq!(structural_widths(6, 1000), vec![80, 320, 150, 150, 150, 150]);
        assert_eq!(
            structural_widths(7, 1000),
            vec![80, 300, 120, 130, 120, 130, 120]
        );
        assert_eq!(structural_widths(3, 1000), vec![80, 460, 460]);
        assert_eq!(structural_widths(1, 777), vec![777]);
        assert!(structural_widths(0, 777).is_empty());
    }

    #[test]
    fn test_explicit_hints_win() {
        let mut table = table_of(&[&["a", "b", "c", "d", "e"]]);
        table.column_hints = vec![Some(20.0), Some(20.0), Some(20.0), Some(20.0), Some(20.0)];
        let layout = allocate(&table, 800, ColumnStrategy::ContentWeighted, &DEFAULT_FONTS);
        assert_eq!(layout.algorithm, Algorithm::ExplicitHints);
        assert_eq!(layout.widths, vec![160; 5]);
    }

    #[test]
    fn test_explicit_hints_over_100_scaled() {
        let widths = explicit_widths(&[100.0, 100.0], 800);
        assert!(widths.iter().sum::<u32>() <= 800);
        assert_eq!(widths, vec![400, 400]);
    }

    #[test]
    fn test_partial_hints_ignored() {
        let mut table = table_of(&[&["a", "b"]]);
        table.column_hints = vec![Some(50.0)];
        let layout = allocate(&table, 800, ColumnStrategy::Auto, &DEFAULT_FONTS);
        assert_eq!(layout.algorithm, Algorithm::ContentWeighted);
    }

    #[test]
    fn test_ordinal_header_selects_structural() {
        let mut table = Table::default();
        table.add_row(TableRow::header(vec![
            TableCell::header("Lp."),
            TableCell::header("Name"),
            TableCell::header("Qty"),
        ]));
        table.add_row(TableRow::from_strings(["x", "Widget", "2"]));
        assert_eq!(
            choose_algorithm(&table, 3, ColumnStrategy::Auto),
            Algorithm::Structural
        );
    }

    #[test]
    fn test_ordinal_body_selects_structural() {
        let table = table_of(&[&["1.", "Widget", "2"], &["2.", "Gadget", "1"]]);
        assert_eq!(
            choose_algorithm(&table, 3, ColumnStrategy::Auto),
            Algorithm::Structural
        );
        let table = table_of(&[&["A", "Widget", "2"]]);
        assert_eq!(
            choose_algorithm(&table, 3, ColumnStrategy::Auto),
            Algorithm::ContentWeighted
        );
    }

    #[test]
    fn test_content_weighted_proportional() {
        let table = table_of(&[&["Name", "Qty"], &["Widget", "1"]]);
        let layout = allocate(&table, 800, ColumnStrategy::Auto, &DEFAULT_FONTS);
        assert_eq!(layout.algorithm, Algorithm::ContentWeighted);
        // lengths 6 and 3: floor 40 each, 480 and 240 proportional
        assert_eq!(layout.widths, vec![520, 280]);
        assert!(layout.total() <= 800);
    }

    #[test]
    fn test_content_weighted_all_empty() {
        let table = table_of(&[&["", "", ""]]);
        let layout = allocate(&table, 800, ColumnStrategy::ContentWeighted, &DEFAULT_FONTS);
        assert_eq!(layout.widths, vec![266, 266, 266]);
    }

    #[test]
    fn test_content_weighted_shrinks_to_usable() {
        let long = "x".repeat(60);
        let table = table_of(&[&[long.as_str(), long.as_str(), long.as_str(), "1"]]);
        let layout = allocate(&table, 400, ColumnStrategy::ContentWeighted, &DEFAULT_FONTS);
        assert_eq!(layout.total(), 400);
        // Shrinking evens out the widest columns
        let long_cols = &layout.widths[..3];
        let spread = long_cols.iter().max().unwrap() - long_cols.iter().min().unwrap();
        assert!(spread <= 1);
        assert_eq!(layout.widths[3], 15);
    }

    #[test]
    fn test_content_weighted_caps_long_column() {
        let long = "x".repeat(100);
        let table = table_of(&[&[long.as_str(), "y"]]);
        let layout = allocate(&table, 800, ColumnStrategy::ContentWeighted, &DEFAULT_FONTS);
        // proportional share is 752, the text wants 1500, the cap is 40%
        assert_eq!(layout.widths, vec![320, 47]);
        assert!(layout.widths[0] <= 320);
    }

    #[test]
    fn test_line_break_weight() {
        let mut table = Table::default();
        table.add_row(TableRow::new(vec![
            TableCell::text("abcd\nefgh"),
            TableCell::text("abcdefghi"),
        ]));
        let grid = OccupancyGrid::build(&table);
        // 9 chars * 1.5 vs 9 chars
        assert_eq!(content_lengths(&table, &grid), vec![13.5, 9.0]);
    }

    #[test]
    fn test_numeric_columns() {
        let mut table = Table::default();
        table.add_row(TableRow::header(vec![
            TableCell::header("Item"),
            TableCell::header("Price"),
        ]));
        table.add_row(TableRow::from_strings(["Bolt", "1 200,00"]));
        table.add_row(TableRow::from_strings(["Nut", ""]));
        let grid = OccupancyGrid::build(&table);
        assert_eq!(numeric_columns(&table, &grid), vec![false, true]);
    }

    #[test]
    fn test_span_width() {
        let layout = ColumnLayout {
            widths: vec![10, 20, 30],
            algorithm: Algorithm::Structural,
        };
        assert_eq!(layout.span_width(1, 2), 50);
        assert_eq!(layout.span_width(2, 5), 30);
    }
}
