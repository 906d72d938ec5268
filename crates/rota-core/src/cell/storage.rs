//! Cell storage implementation
//!
//! Sparse storage for worksheet cells. Only cells with a value or a
//! non-default style are stored, using a row-based BTreeMap structure.

use std::collections::BTreeMap;

use super::CellValue;
use crate::style::StylePool;

/// Complete data for a single cell
#[derive(Debug, Clone)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a new cell with a value and default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Create a new cell with a value and style
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// Check if this cell is effectively empty (no value and default style)
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Sparse row-based storage for worksheet cells
///
/// Structure: `BTreeMap<row_index, BTreeMap<col_index, CellData>>`, so
/// iteration is always row-major and deterministic.
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
    style_pool: StylePool,
}

impl CellStorage {
    /// Create a new empty cell storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get a mutable cell
    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut CellData> {
        self.rows.get_mut(&row).and_then(|r| r.get_mut(&col))
    }

    /// Set a cell
    ///
    /// If the cell data is empty (no value, default style), the cell is removed.
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_empty() {
            self.remove(row, col);
        } else {
            self.rows.entry(row).or_default().insert(col, data);
        }
    }

    /// Set just the cell value (preserving style)
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map(|c| c.style_index).unwrap_or(0);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Set just the cell style (preserving value)
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        match self.get_mut(row, col) {
            Some(cell) => {
                cell.style_index = style_index;
                if cell.is_empty() {
                    self.remove(row, col);
                }
            }
            None => self.set(row, col, CellData::with_style(CellValue::Empty, style_index)),
        }
    }

    /// Remove a cell
    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellData> {
        let row_map = self.rows.get_mut(&row)?;
        let result = row_map.remove(&col);
        if row_map.is_empty() {
            self.rows.remove(&row);
        }
        result
    }

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// Check if storage is empty
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get the bounds of stored cells
    ///
    /// Returns (min_row, min_col, max_row, max_col) or None if empty
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;

        let mut min_col = u16::MAX;
        let mut max_col = 0u16;

        for row_data in self.rows.values() {
            if let Some(&col) = row_data.keys().next() {
                min_col = min_col.min(col);
            }
            if let Some(&col) = row_data.keys().next_back() {
                max_col = max_col.max(col);
            }
        }

        Some((min_row, min_col, max_row, max_col))
    }

    /// Iterate over all cells in row order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, data)| (row, col, data)))
    }

    /// Iterate over cells in a specific row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(&col, data)| (col, data)))
    }

    /// Get the style pool
    pub fn style_pool(&self) -> &StylePool {
        &self.style_pool
    }

    /// Get the style pool mutably
    pub fn style_pool_mut(&mut self) -> &mut StylePool {
        &mut self.style_pool
    }
}
