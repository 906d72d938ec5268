//! Divider row detection
//!
//! Sites are separated by rows that carry no text and are painted across
//! (nearly) the whole used width in one colour.

use rota_core::Color;

use crate::bounds::UsedBounds;
use crate::colour::{colour_consistency, fill_coverage};
use crate::config::GasConfig;
use crate::grid::Grid;

/// Divider rows found in a sheet, ascending
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DividerRows {
    /// Every row that satisfies the divider predicate
    pub raw: Vec<u32>,
    /// `raw` with each run of adjacent rows reduced to its first row
    pub collapsed: Vec<u32>,
}

impl DividerRows {
    /// Build from an ascending list of divider rows
    pub fn from_raw(raw: Vec<u32>) -> Self {
        let collapsed = raw
            .iter()
            .enumerate()
            .filter(|&(i, &row)| i == 0 || raw[i - 1] + 1 != row)
            .map(|(_, &row)| row)
            .collect();
        Self { raw, collapsed }
    }

    /// Whether a row satisfied the divider predicate (before collapsing)
    pub fn is_divider(&self, row: u32) -> bool {
        self.raw.binary_search(&row).is_ok()
    }

    /// Number of logical boundaries
    pub fn len(&self) -> usize {
        self.collapsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collapsed.is_empty()
    }
}

/// Whether `row` is a divider within the used column range.
///
/// A divider holds no text, paints at least `divider_fill_coverage` of the
/// used columns with a non-white-like fill, and at least
/// `divider_colour_consistency` of those painted cells share the row's first
/// colour.
pub fn is_divider_row(grid: &dyn Grid, row: u32, bounds: &UsedBounds, config: &GasConfig) -> bool {
    let mut fills: Vec<Option<Color>> = Vec::with_capacity(bounds.col_count());
    for col in bounds.cols() {
        let cell = grid.cell_at(row, col);
        if cell.has_text() {
            return false;
        }
        fills.push(cell.fill);
    }

    fill_coverage(&fills) >= config.divider_fill_coverage
        && colour_consistency(&fills) >= config.divider_colour_consistency
}

/// Scan every used row for dividers
pub fn find_divider_rows(grid: &dyn Grid, bounds: &UsedBounds, config: &GasConfig) -> DividerRows {
    let raw: Vec<u32> = bounds
        .rows()
        .filter(|&row| is_divider_row(grid, row, bounds, config))
        .collect();
    let dividers = DividerRows::from_raw(raw);

    log::debug!(
        "{}: divider rows {:?} (collapsed from {} raw)",
        grid.sheet_name(),
        dividers.collapsed,
        dividers.raw.len()
    );
    dividers
}
