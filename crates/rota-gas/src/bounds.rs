//! Used-range analysis

use std::ops::RangeInclusive;

use rota_core::CellRange;

use crate::grid::Grid;

/// Rectangle holding all meaningful content of a sheet
///
/// Always non-empty: `start_row <= end_row` and `start_col <= end_col`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsedBounds {
    pub start_row: u32,
    pub end_row: u32,
    pub start_col: u16,
    pub end_col: u16,
}

impl UsedBounds {
    pub fn rows(&self) -> RangeInclusive<u32> {
        self.start_row..=self.end_row
    }

    pub fn cols(&self) -> RangeInclusive<u16> {
        self.start_col..=self.end_col
    }

    pub fn col_count(&self) -> usize {
        usize::from(self.end_col - self.start_col) + 1
    }

    /// Same rectangle as an A1 range
    pub fn to_range(&self) -> CellRange {
        CellRange::from_indices(self.start_row, self.start_col, self.end_row, self.end_col)
    }

    fn include(bounds: &mut Option<UsedBounds>, row: u32, col: u16) {
        match bounds {
            Some(b) => {
                b.start_row = b.start_row.min(row);
                b.end_row = b.end_row.max(row);
                b.start_col = b.start_col.min(col);
                b.end_col = b.end_col.max(col);
            }
            None => {
                *bounds = Some(UsedBounds {
                    start_row: row,
                    end_row: row,
                    start_col: col,
                    end_col: col,
                })
            }
        }
    }

    fn union(a: Option<UsedBounds>, b: Option<UsedBounds>) -> Option<UsedBounds> {
        match (a, b) {
            (Some(a), Some(b)) => Some(UsedBounds {
                start_row: a.start_row.min(b.start_row),
                end_row: a.end_row.max(b.end_row),
                start_col: a.start_col.min(b.start_col),
                end_col: a.end_col.max(b.end_col),
            }),
            (a, b) => a.or(b),
        }
    }
}

/// Bounds of every cell with text or with any fill.
///
/// Text and fill are tracked separately and then unioned: divider rows are
/// filled but textless, so text alone would clip them. Cells that are
/// stored but carry neither (e.g. whitespace, or a number format only) do
/// not count. `None` means the sheet has nothing at all.
pub fn used_bounds(grid: &dyn Grid) -> Option<UsedBounds> {
    let mut text_bounds = None;
    let mut fill_bounds = None;

    for cell in grid.populated_cells() {
        if cell.has_text() {
            UsedBounds::include(&mut text_bounds, cell.row, cell.col);
        }
        if cell.fill.is_some() {
            UsedBounds::include(&mut fill_bounds, cell.row, cell.col);
        }
    }

    UsedBounds::union(text_bounds, fill_bounds)
}
