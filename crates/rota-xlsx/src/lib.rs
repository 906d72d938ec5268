//! # rota-xlsx
//!
//! XLSX (Office Open XML) reader for rota.
//!
//! Only what an import needs is read: cell values (shared strings, inline
//! strings, numbers, booleans, errors, cached formula results), cell fills,
//! number formats (so date-formatted serials arrive as dates) and sheet
//! visibility.

pub mod error;
pub mod reader;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
