//! Table occupancy grid.
//!
//! Places every cell on the column grid before rendering. A cell flows into
//! the first column not covered by a rowspan from an earlier row; positions
//! covered that way are marked skipped so nothing is drawn over them.

use crate::model::Table;

/// Grid position of one source cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSlot {
    /// Index of the cell within its row
    pub cell: usize,
    /// First grid column
    pub column: usize,
    /// Columns covered
    pub colspan: usize,
}

/// Cell placement and rowspan coverage for a table.
#[derive(Debug, Clone, Default)]
pub struct OccupancyGrid {
    columns: usize,
    skip: Vec<Vec<bool>>,
    slots: Vec<Vec<CellSlot>>,
}

impl OccupancyGrid {
    /// Place the cells of `table`.
    pub fn build(table: &Table) -> Self {
        let row_count = table.rows.len();
        let mut occupied: Vec<Vec<bool>> = vec![Vec::new(); row_count];
        let mut skip: Vec<Vec<bool>> = vec![Vec::new(); row_count];
        let mut slots = Vec::with_capacity(row_count);
        let mut columns = table.column_count();

        for (r, row) in table.rows.iter().enumerate() {
            let mut row_slots = Vec::with_capacity(row.cells.len());
            let mut col = 0;
            for (i, cell) in row.cells.iter().enumerate() {
                while occupied[r].get(col).copied().unwrap_or(false) {
                    col += 1;
                }
                let span = cell.colspan.max(1);
                let last_row = (r + cell.rowspan.max(1)).min(row_count);
                for rr in r..last_row {
                    for cc in col..col + span {
                        mark(&mut occupied[rr], cc);
                        if rr > r {
                            mark(&mut skip[rr], cc);
                        }
                    }
                }
                row_slots.push(CellSlot {
                    cell: i,
                    column: col,
                    colspan: span,
                });
                col += span;
            }
            columns = columns.max(col);
            slots.push(row_slots);
        }

        columns = skip.iter().map(Vec::len).fold(columns, usize::max);
        for flags in skip.iter_mut() {
            flags.resize(columns, false);
        }

        Self {
            columns,
            skip,
            slots,
        }
    }

    /// Number of grid columns.
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.slots.len()
    }

    /// Whether a position is covered by a rowspan from an earlier row.
    pub fn is_skipped(&self, row: usize, col: usize) -> bool {
        self.skip
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .unwrap_or(false)
    }

    /// Placed cells of a row, left to right.
    pub fn slots(&self, row: usize) -> &[CellSlot] {
        self.slots.get(row).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn mark(flags: &mut Vec<bool>, col: usize) {
    if flags.len() <= col {
        flags.resize(col + 1, false);
    }
    flags[col] = true;
}
