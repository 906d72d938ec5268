//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::style::{CellStyle, Color, FillStyle};
use crate::{MAX_COLS, MAX_ROWS};

/// A worksheet (single sheet in a workbook)
#[derive(Debug)]
pub struct Worksheet {
    /// Sheet name
    name: String,
    /// Cell storage
    cells: CellStorage,
    /// Sheet is visible (`state="hidden"`/`"veryHidden"` clears this)
    visible: bool,
    /// Whole-row default styles (style pool indices)
    row_styles: BTreeMap<u32, u32>,
    /// Column span default styles as `(first, last, style index)`; later spans win
    column_styles: Vec<(u16, u16, u32)>,
}

impl Worksheet {
    /// Create a new worksheet with the given name
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            visible: true,
            row_styles: BTreeMap::new(),
            column_styles: Vec::new(),
        }
    }

    /// Get the sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check if the sheet is visible
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Set sheet visibility
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    // === Cell Access ===

    /// Get a cell by address string (e.g., "A1")
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(addr.row, addr.col))
    }

    /// Get a cell by row and column indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Get cell value (convenience method)
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Get cell value by indices
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or(CellValue::Empty)
    }

    /// Get the non-default style applied to a cell, if any.
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&CellStyle> {
        match self.cells.get(row, col).map(|c| c.style_index) {
            None | Some(0) => None,
            Some(idx) => self.cells.style_pool().get(idx),
        }
    }

    /// Style a cell displays with: its own, else its row's, else its column's
    pub fn effective_style_at(&self, row: u32, col: u16) -> Option<&CellStyle> {
        self.cell_style_at(row, col)
            .or_else(|| self.row_style(row))
            .or_else(|| self.column_style(col))
    }

    /// Background fill a cell displays with; unstyled cells have [`FillStyle::None`]
    pub fn cell_fill_at(&self, row: u32, col: u16) -> &FillStyle {
        static NO_FILL: FillStyle = FillStyle::None;
        self.effective_style_at(row, col)
            .map(|s| &s.fill)
            .unwrap_or(&NO_FILL)
    }

    // === Cell Modification ===

    /// Set a cell value by address string
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a cell value by row and column indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        self.validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a cell style by address string
    pub fn set_cell_style(&mut self, address: &str, style: &CellStyle) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Set a cell style by row and column indices
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &CellStyle) -> Result<()> {
        self.validate_cell_position(row, col)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Paint a cell with a solid fill, keeping its number format
    pub fn set_cell_fill(&mut self, address: &str, color: Color) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_fill_at(addr.row, addr.col, color)
    }

    /// Paint a cell with a solid fill by indices
    pub fn set_cell_fill_at(&mut self, row: u32, col: u16, color: Color) -> Result<()> {
        let style = self
            .cell_style_at(row, col)
            .cloned()
            .unwrap_or_default()
            .fill_color(color);
        self.set_cell_style_at(row, col, &style)
    }

    // === Row and Column Styles ===

    /// Set the default style of a whole row
    pub fn set_row_style(&mut self, row: u32, style: &CellStyle) -> Result<()> {
        self.validate_cell_position(row, 0)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        if style_index == 0 {
            self.row_styles.remove(&row);
        } else {
            self.row_styles.insert(row, style_index);
        }
        Ok(())
    }

    /// Set the default style of the columns `first_col..=last_col`
    pub fn set_column_style(
        &mut self,
        first_col: u16,
        last_col: u16,
        style: &CellStyle,
    ) -> Result<()> {
        if first_col > last_col {
            return Err(Error::InvalidRange(format!(
                "column span {}..={} is reversed",
                first_col, last_col
            )));
        }
        self.validate_cell_position(0, last_col)?;
        let style_index = self.cells.style_pool_mut().get_or_insert(style.clone());
        self.column_styles.push((first_col, last_col, style_index));
        Ok(())
    }

    /// Default style of a row, if one was set
    pub fn row_style(&self, row: u32) -> Option<&CellStyle> {
        let idx = *self.row_styles.get(&row)?;
        self.cells.style_pool().get(idx)
    }

    /// Default style of a column, if a span covering it was set
    pub fn column_style(&self, col: u16) -> Option<&CellStyle> {
        self.column_styles
            .iter()
            .rev()
            .find(|(first, last, _)| (*first..=*last).contains(&col))
            .and_then(|&(_, _, idx)| self.cells.style_pool().get(idx))
            .filter(|style| !style.is_default())
    }

    /// Rows carrying a default style, ascending
    pub fn styled_rows(&self) -> impl Iterator<Item = (u32, &CellStyle)> {
        self.row_styles
            .iter()
            .filter_map(|(&row, &idx)| Some((row, self.cells.style_pool().get(idx)?)))
    }

    /// Columns carrying a default style within `first_col..=last_col`, ascending
    pub fn styled_columns(&self, first_col: u16, last_col: u16) -> Vec<(u16, &CellStyle)> {
        let mut cols: Vec<u16> = self
            .column_styles
            .iter()
            .flat_map(|&(first, last, _)| first.max(first_col)..=last.min(last_col))
            .collect();
        cols.sort_unstable();
        cols.dedup();
        cols.into_iter()
            .filter_map(|col| Some((col, self.column_style(col)?)))
            .collect()
    }

    // === Range Operations ===

    /// Get the used range (bounds of all stored cells, styled blanks included)
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    fn validate_cell_position(&self, row: u32, col: u16) -> Result<()> {
        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }
        if col >= MAX_COLS {
            return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
        }
        Ok(())
    }

    /// Get the number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// Check if the worksheet is empty
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterate over all stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Iterate over the stored cells of one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }
}
