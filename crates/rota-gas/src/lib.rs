//! # rota-gas
//!
//! Ingestion engine for "GAS" rota workbooks: freeform sheets where sites
//! are separated by solid-coloured, textless divider rows and addresses,
//! dates and operative names sit wherever the last editor put them.
//!
//! The engine turns one worksheet into a [`ParseResult`]: the shifts it
//! could recover plus an itemised list of [`ImportFailure`]s for the parts
//! it could not. Malformed input never produces an `Err`; only an unreadable
//! buffer, an unsupported import type or a bad configuration does.
//!
//! ## Example
//!
//! ```rust
//! use rota_core::{Color, Worksheet};
//! use rota_gas::{parse_sheet, FailureReason};
//!
//! let mut sheet = Worksheet::new("UNITAS");
//! for col in 0..4 {
//!     sheet.set_cell_fill_at(0, col, Color::GRAY).unwrap();
//!     sheet.set_cell_fill_at(4, col, Color::GRAY).unwrap();
//! }
//! sheet.set_cell_value("A2", "12 High Street, Leeds LS1 4AB").unwrap();
//! sheet.set_cell_value("B3", "16/06/2025").unwrap();
//! sheet.set_cell_value("C3", "17/06/2025").unwrap();
//! sheet.set_cell_value("D3", "18/06/2025").unwrap();
//! sheet.set_cell_value("B4", "John Smith & Jane Doe").unwrap();
//!
//! let result = parse_sheet(&sheet);
//! assert_eq!(result.shift_count(), 2);
//! assert_eq!(result.parsed[0].source.cell_ref, "B4");
//! assert!(result.failures.is_empty());
//!
//! let empty = parse_sheet(&Worksheet::new("UNITAS"));
//! assert_eq!(empty.failures[0].reason, FailureReason::SheetAppearsEmpty);
//! ```

pub mod address;
pub mod block;
pub mod bounds;
pub mod colour;
pub mod config;
pub mod dates;
pub mod divider;
pub mod error;
pub mod grid;
pub mod names;
pub mod parser;
pub mod record;
pub mod sheet;

pub use config::GasConfig;
pub use error::ImportError;
pub use grid::{Grid, GridCell};
pub use parser::{
    parse_gas_bytes, parse_gas_workbook, parse_sheet, parse_workbook_by_type, BlockLayout,
    GasParser, SheetLayout,
};
pub use record::{
    FailureReason, ImportFailure, ImportType, ParseResult, RawParsedShift, ShiftSource, ShiftType,
};
pub use sheet::{select_sheet_index, select_worksheet};
