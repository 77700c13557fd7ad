//! Table rendering.

use super::columns::{allocate_with_grid, numeric_columns};
use super::fonts::FontRole;
use super::grid::OccupancyGrid;
use super::renderer::ZplRenderer;
use super::text::MIN_LINE_SPACING;
use crate::model::{Table, TableCell, TableRow, TextAlign};

/// Cursor drop below a horizontal rule.
pub const RULE_GAP: u32 = 15;
/// Extra space after each row.
pub const ROW_GAP: u32 = 20;
/// Rule position above the cursor after a row.
pub const RULE_OFFSET: u32 = 10;
/// Horizontal inset of cell text.
pub const CELL_INSET: u32 = 5;

const RIGHT_CLASSES: &[&str] = &["currency", "right", "text-right"];
const CENTER_CLASSES: &[&str] = &["center", "text-center"];

impl ZplRenderer<'_> {
    /// Render `table` with its top-left corner at `(x, y)`. Returns the
    /// cursor below the last row rule.
    pub(super) fn render_table(&mut self, table: &Table, x: u32, y: u32) -> u32 {
        let usable = self.canvas.width_from(x);
        if self
            .registry
            .is_clear_above(y, self.fonts.max_height() + MIN_LINE_SPACING)
        {
            self.registry.clear();
        }

        let grid = OccupancyGrid::build(table);
        let layout = allocate_with_grid(
            table,
            &grid,
            usable,
            self.config.column_strategy,
            &self.fonts,
        );
        let offsets = layout.offsets();
        let numeric = numeric_columns(table, &grid);
        let min_row_height = 2 * self.fonts.table_line_height();

        self.stats.tables += 1;
        self.stats.algorithms.push(layout.algorithm);

        self.rule(x, y, usable);
        let mut cursor = y.saturating_add(RULE_GAP);

        for (r, row) in table.rows.iter().enumerate() {
            let mut row_height = 0;
            for slot in grid.slots(r) {
                let cell = &row.cells[slot.cell];
                let cell_x = x + offsets.get(slot.column).copied().unwrap_or(0);
                let cell_width = layout.span_width(slot.column, slot.colspan);
                let numeric_column = slot.colspan == 1
                    && numeric.get(slot.column).copied().unwrap_or(false);
                let align = self.cell_alignment(cell, numeric_column);
                let role = if cell.is_header || !row.is_body() {
                    FontRole::TableHeader
                } else {
                    FontRole::TableCell
                };
                let height = self.render_cell(cell, row, cell_x, cursor, cell_width, role, align);
                row_height = row_height.max(height);
            }

            cursor = cursor.saturating_add(row_height.max(min_row_height).saturating_add(ROW_GAP));
            let rule_y = cursor - RULE_OFFSET;
            self.rule(x, rule_y, usable);
            cursor = rule_y.saturating_add(RULE_GAP);
            self.stats.table_rows += 1;
        }

        cursor
    }

    /// Render each line of a cell. Returns the height the cell used.
    #[allow(clippy::too_many_arguments)]
    fn render_cell(
        &mut self,
        cell: &TableCell,
        row: &TableRow,
        x: u32,
        top: u32,
        width: u32,
        role: FontRole,
        align: TextAlign,
    ) -> u32 {
        let half_line = self.fonts.get(role).height / 2;
        let bold = self.styles.resolve(&cell.info).is_bold()
            || self.styles.resolve(&row.info).is_bold();
        let text_width = width.saturating_sub(2 * CELL_INSET).max(1);

        let mut line_y = top;
        let mut height = 0;
        for line in cell.lines() {
            if let Some(new_y) =
                self.emit_text(line, x + CELL_INSET, line_y, role, text_width, align, bold)
            {
                line_y = new_y.saturating_add(half_line);
                height = line_y - top;
            }
        }
        height
    }

    /// Cell class keywords win, then a resolved `text-align`, then the
    /// numeric column default.
    fn cell_alignment(&self, cell: &TableCell, numeric_column: bool) -> TextAlign {
        let info = &cell.info;
        if RIGHT_CLASSES.iter().any(|c| info.has_class(c)) {
            return TextAlign::Right;
        }
        if CENTER_CLASSES.iter().any(|c| info.has_class(c)) {
            return TextAlign::Center;
        }
        if info.has_class("left") {
            return TextAlign::Left;
        }
        if let Some(align) = self.styles.resolve(info).text_align {
            return align;
        }
        if numeric_column {
            TextAlign::Right
        } else {
            TextAlign::Left
        }
    }
}
