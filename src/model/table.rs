//! Table types.

use super::ElementInfo;
use serde::{Deserialize, Serialize};

/// Check whether text looks like a number or an amount (`1 234,50`).
pub fn looks_numeric(text: &str) -> bool {
    let text = text.trim();
    !text.is_empty()
        && text.chars().any(|c| c.is_ascii_digit())
        && text
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_whitespace() || c == '.' || c == ',')
}

/// A table structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Table {
    /// The `<table>` element
    pub info: ElementInfo,

    /// Rows in source order (head, body and foot flattened)
    pub rows: Vec<TableRow>,

    /// `<col>` declarations in source order
    pub columns: Vec<ColumnSpec>,

    /// Width hints resolved from `columns`, one entry per covered column
    pub column_hints: Vec<Option<f32>>,
}

impl Table {
    /// Create a new empty table.
    pub fn new(info: ElementInfo) -> Self {
        Self {
            info,
            rows: Vec::new(),
            columns: Vec::new(),
            column_hints: Vec::new(),
        }
    }

    /// Add a row to the table.
    pub fn add_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of grid columns: the widest row, counting colspans.
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(TableRow::span_width).max().unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows that are neither in `<thead>` nor made of header cells only.
    pub fn body_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| r.is_body())
    }

    /// Percentages for every column, if each one has a hint.
    pub fn complete_hints(&self) -> Option<Vec<f32>> {
        let n = self.column_count();
        if n == 0 || self.column_hints.len() != n {
            return None;
        }
        self.column_hints.iter().copied().collect()
    }

    /// Check if the table has complex structure (merged cells).
    pub fn has_merged_cells(&self) -> bool {
        self.rows
            .iter()
            .flat_map(|r| &r.cells)
            .any(|c| c.is_merged())
    }

    /// Get plain text representation of the table.
    pub fn plain_text(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.plain_text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Summarize the table's shape.
    pub fn structure(&self) -> TableStructure {
        let columns = self.column_count();
        let mut numeric_columns = vec![false; columns];
        for (col, flag) in numeric_columns.iter_mut().enumerate() {
            let mut seen = false;
            let mut all_numeric = true;
            for row in self.body_rows() {
                if let Some(cell) = row.cell_at_column(col) {
                    if cell.text.trim().is_empty() {
                        continue;
                    }
                    seen = true;
                    all_numeric &= looks_numeric(&cell.text);
                }
            }
            *flag = seen && all_numeric;
        }

        TableStructure {
            rows: self.row_count(),
            columns,
            header_rows: self
                .rows
                .iter()
                .filter(|r| r.section == RowSection::Head || r.is_header)
                .count(),
            footer_rows: self
                .rows
                .iter()
                .filter(|r| r.section == RowSection::Foot)
                .count(),
            merged_cells: self
                .rows
                .iter()
                .flat_map(|r| &r.cells)
                .filter(|c| c.is_merged())
                .count(),
            numeric_columns,
        }
    }
}

/// A `<col>` element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub info: ElementInfo,
    /// Columns covered (the `span` attribute)
    pub span: usize,
    /// Percentage from the `width` attribute
    pub width_attr: Option<f32>,
}

/// Shape summary of a table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStructure {
    pub rows: usize,
    pub columns: usize,
    pub header_rows: usize,
    pub footer_rows: usize,
    pub merged_cells: usize,
    /// Per column: every non-empty body cell looks numeric
    pub numeric_columns: Vec<bool>,
}

/// Section a row was declared in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowSection {
    Head,
    #[default]
    Body,
    Foot,
}

/// A table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRow {
    /// The `<tr>` element
    pub info: ElementInfo,

    /// Cells in the row
    pub cells: Vec<TableCell>,

    /// Whether every cell is a header cell
    pub is_header: bool,

    /// Enclosing row group
    pub section: RowSection,
}

impl TableRow {
    /// Create a new body row with cells.
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            info: ElementInfo::new("tr"),
            cells,
            is_header: false,
            section: RowSection::Body,
        }
    }

    /// Create a header row.
    pub fn header(cells: Vec<TableCell>) -> Self {
        Self {
            is_header: true,
            section: RowSection::Head,
            ..Self::new(cells)
        }
    }

    /// Create a row from text values.
    pub fn from_strings<S: Into<String>>(values: impl IntoIterator<Item = S>) -> Self {
        Self::new(values.into_iter().map(TableCell::text).collect())
    }

    /// Set the row classes and return self.
    pub fn with_classes<S: Into<String>>(mut self, classes: impl IntoIterator<Item = S>) -> Self {
        self.info = self.info.with_classes(classes);
        self
    }

    /// Columns covered by this row's own cells.
    pub fn span_width(&self) -> usize {
        self.cells.iter().map(|c| c.colspan).sum()
    }

    /// Whether this is a data row.
    pub fn is_body(&self) -> bool {
        self.section != RowSection::Head && !self.is_header
    }

    /// The cell whose span starts at `col`, ignoring rowspans from above.
    pub fn cell_at_column(&self, col: usize) -> Option<&TableCell> {
        let mut start = 0;
        for cell in &self.cells {
            if start == col {
                return Some(cell);
            }
            start += cell.colspan;
            if start > col {
                return None;
            }
        }
        None
    }

    /// Get plain text representation.
    pub fn plain_text(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.text.replace('\n', " "))
            .collect::<Vec<_>>()
            .join("\t")
    }
}

/// A table cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCell {
    /// The `<td>`/`<th>` element
    pub info: ElementInfo,

    /// Cell text; `<br>` is kept as `\n`
    pub text: String,

    /// Number of columns this cell spans (at least 1)
    pub colspan: usize,

    /// Number of rows this cell spans (at least 1)
    pub rowspan: usize,

    /// Whether this is a `<th>`
    pub is_header: bool,

    /// Whether the source contained an explicit line break
    pub has_line_break: bool,
}

impl TableCell {
    /// Create a new cell with text content.
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            info: ElementInfo::new("td"),
            has_line_break: text.contains('\n'),
            text,
            colspan: 1,
            rowspan: 1,
            is_header: false,
        }
    }

    /// Create a header cell.
    pub fn header(text: impl Into<String>) -> Self {
        Self {
            info: ElementInfo::new("th"),
            is_header: true,
            ..Self::text(text)
        }
    }

    /// Create an empty cell.
    pub fn empty() -> Self {
        Self::text("")
    }

    /// Set colspan and return self.
    pub fn colspan(mut self, span: usize) -> Self {
        self.colspan = span.max(1);
        self
    }

    /// Set rowspan and return self.
    pub fn rowspan(mut self, span: usize) -> Self {
        self.rowspan = span.max(1);
        self
    }

    /// Set the cell classes and return self.
    pub fn with_classes<S: Into<String>>(mut self, classes: impl IntoIterator<Item = S>) -> Self {
        self.info = self.info.with_classes(classes);
        self
    }

    /// Text split on explicit line breaks, blank lines dropped.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text
            .split('\n')
            .map(str::trim)
            .filter(|l| !l.is_empty())
    }

    /// Check if the cell is empty.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Check if this cell spans multiple rows or columns.
    pub fn is_merged(&self) -> bool {
        self.rowspan > 1 || self.colspan > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_new() {
        let table = Table::default();
        assert!(table.is_empty());
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 0);
        assert!(table.complete_hints().is_none());
    }

    #[test]
    fn test_column_count_uses_colspan() {
        let mut table = Table::default();
        table.add_row(TableRow::header(vec![
            TableCell::header("Lp."),
            TableCell::header("Name"),
        ]));
        table.add_row(TableRow::new(vec![
            TableCell::text("1"),
            TableCell::text("Widget").colspan(3),
        ]));
        assert_eq!(table.column_count(), 4);
        assert_eq!(table.body_rows().count(), 1);
        assert!(table.has_merged_cells());
    }

    #[test]
    fn test_complete_hints() {
        let mut table = Table::default();
        table.add_row(TableRow::from_strings(["a", "b"]));
        table.column_hints = vec![Some(30.0), None];
        assert!(table.complete_hints().is_none());
        table.column_hints = vec![Some(30.0), Some(70.0)];
        assert_eq!(table.complete_hints(), Some(vec![30.0, 70.0]));
        table.column_hints = vec![Some(100.0)];
        assert!(table.complete_hints().is_none());
    }

    #[test]
    fn test_cell_at_column() {
        let row = TableRow::new(vec![
            TableCell::text("a").colspan(2),
            TableCell::text("b"),
        ]);
        assert_eq!(row.cell_at_column(0).map(|c| c.text.as_str()), Some("a"));
        assert!(row.cell_at_column(1).is_none());
        assert_eq!(row.cell_at_column(2).map(|c| c.text.as_str()), Some("b"));
        assert!(row.cell_at_column(3).is_none());
    }

    #[test]
    fn test_cell_lines() {
        let cell = TableCell::text("Widget\n SKU-1 \n");
        assert!(cell.has_line_break);
        assert_eq!(cell.lines().collect::<Vec<_>>(), vec!["Widget", "SKU-1"]);
    }

    #[test]
    fn test_looks_numeric() {
        assert!(looks_numeric("1 234,50"));
        assert!(looks_numeric("12.00"));
        assert!(!looks_numeric("12 szt."));
        assert!(!looks_numeric(" , "));
        assert!(!looks_numeric(""));
    }

    #[test]
    fn test_structure() {
        let mut table = Table::default();
        table.add_row(TableRow::header(vec![
            TableCell::header("Item"),
            TableCell::header("Qty"),
        ]));
        table.add_row(TableRow::from_strings(["Bolt", "4"]));
        table.add_row(TableRow::new(vec![
            TableCell::text("Nut").rowspan(2),
            TableCell::text("10"),
        ]));
        let s = table.structure();
        assert_eq!(s.rows, 3);
        assert_eq!(s.columns, 2);
        assert_eq!(s.header_rows, 1);
        assert_eq!(s.merged_cells, 1);
        assert_eq!(s.numeric_columns, vec![false, true]);
    }
}
