//! # rota-core
//!
//! In-memory workbook model shared by the rota crates.
//!
//! This crate provides the types every stage of an import works against:
//! - [`CellValue`] - Cell values (numbers, strings, dates, booleans, errors, formulas)
//! - [`CellAddress`] and [`CellRange`] - Cell addressing and ranges
//! - [`CellStyle`] - The parts of a cell's formatting an import cares about (fill, number format)
//! - [`Workbook`], [`Worksheet`] - The document structures
//!
//! ## Example
//!
//! ```rust
//! use rota_core::{CellValue, Color, Workbook};
//!
//! let mut workbook = Workbook::empty();
//! let idx = workbook.add_worksheet_with_name("UNITAS").unwrap();
//! let sheet = workbook.worksheet_mut(idx).unwrap();
//!
//! sheet.set_cell_value("A1", "12 High Street").unwrap();
//! sheet.set_cell_fill("A1", Color::YELLOW).unwrap();
//! sheet.set_cell_value_at(1, 1, CellValue::Number(45000.0)).unwrap();
//!
//! assert_eq!(sheet.get_value("A1").unwrap().display_text(), "12 High Street");
//! ```

pub mod cell;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue, SharedString};
pub use error::{Error, Result};
pub use style::{CellStyle, Color, FillStyle, NumberFormat, PatternType, StylePool};
pub use workbook::{Workbook, WorkbookSettings};
pub use worksheet::Worksheet;

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
