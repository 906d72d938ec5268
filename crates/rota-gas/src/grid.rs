//! Read-only cell grid the heuristics scan
//!
//! Every stage of the GAS pipeline reads the sheet through [`Grid`], so the
//! scanning logic never touches a workbook object model directly. A
//! [`Worksheet`] is the production implementation.

use std::collections::BTreeMap;

use rota_core::{CellAddress, CellValue, Color, Worksheet};

/// One cell as the heuristics see it
#[derive(Debug, Clone, PartialEq)]
pub struct GridCell {
    /// 0-based row
    pub row: u32,
    /// 0-based column
    pub col: u16,
    /// Text a user would read in the cell (untrimmed)
    pub text: String,
    /// Colour painting the cell background, `None` when unfilled
    pub fill: Option<Color>,
    /// Native value, for classifiers that care about more than text
    pub value: CellValue,
}

impl GridCell {
    /// An empty, unfilled cell
    pub fn blank(row: u32, col: u16) -> Self {
        Self {
            row,
            col,
            text: String::new(),
            fill: None,
            value: CellValue::Empty,
        }
    }

    /// True when the cell holds visible, non-whitespace text
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    /// A1-style reference of this cell
    pub fn cell_ref(&self) -> String {
        CellAddress::new(self.row, self.col).to_a1_string()
    }
}

/// Rows × columns of cells with text and fill
pub trait Grid {
    /// Name of the sheet backing this grid, used for traceability
    fn sheet_name(&self) -> &str;

    /// The cell at a position; positions with nothing stored are blank
    fn cell_at(&self, row: u32, col: u16) -> GridCell;

    /// Every cell with a value or a fill, in row-major order
    fn populated_cells(&self) -> Vec<GridCell>;
}

impl Grid for Worksheet {
    fn sheet_name(&self) -> &str {
        self.name()
    }

    fn cell_at(&self, row: u32, col: u16) -> GridCell {
        let fill = self.cell_fill_at(row, col).color();
        match Worksheet::cell_at(self, row, col) {
            Some(data) => GridCell {
                row,
                col,
                text: data.value.display_text(),
                fill,
                value: data.value.clone(),
            },
            None => GridCell {
                fill,
                ..GridCell::blank(row, col)
            },
        }
    }

    /// Stored cells, plus the unstored positions a row or column style paints.
    ///
    /// Row and column styles cover whole rows and columns, so they only count
    /// inside the columns spanned by stored cells. Styled rows extend the row
    /// span because a painted divider row usually has no cells of its own.
    fn populated_cells(&self) -> Vec<GridCell> {
        let mut cells: BTreeMap<(u32, u16), GridCell> = self
            .iter_cells()
            .map(|(row, col, _)| ((row, col), Grid::cell_at(self, row, col)))
            .collect();

        let Some(stored) = self.used_range() else {
            return Vec::new();
        };
        let (first_col, last_col) = (stored.start.col, stored.end.col);
        let styled_rows: Vec<u32> = self.styled_rows().map(|(row, _)| row).collect();
        let first_row = styled_rows
            .first()
            .map_or(stored.start.row, |&r| r.min(stored.start.row));
        let last_row = styled_rows
            .last()
            .map_or(stored.end.row, |&r| r.max(stored.end.row));

        let mut paint = |row: u32, col: u16| {
            if !cells.contains_key(&(row, col)) {
                let cell = Grid::cell_at(self, row, col);
                if cell.fill.is_some() {
                    cells.insert((row, col), cell);
                }
            }
        };
        for &row in &styled_rows {
            for col in first_col..=last_col {
                paint(row, col);
            }
        }
        for (col, _) in self.styled_columns(first_col, last_col) {
            for row in first_row..=last_row {
                paint(row, col);
            }
        }

        cells.into_values().collect()
    }
}
