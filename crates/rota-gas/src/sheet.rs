//! Worksheet selection

use rota_core::{Workbook, Worksheet};

/// Index of the sheet to parse.
///
/// The sheet named exactly `preferred`, else the first visible sheet, else
/// the first sheet. `None` only for a workbook without sheets.
pub fn select_sheet_index(workbook: &Workbook, preferred: &str) -> Option<usize> {
    let sheets: Vec<&Worksheet> = workbook.worksheets().collect();

    sheets
        .iter()
        .position(|ws| ws.name() == preferred)
        .or_else(|| sheets.iter().position(|ws| ws.is_visible()))
        .or_else(|| (!sheets.is_empty()).then_some(0))
}

/// The sheet to parse, see [`select_sheet_index`]
pub fn select_worksheet<'a>(workbook: &'a Workbook, preferred: &str) -> Option<&'a Worksheet> {
    select_sheet_index(workbook, preferred).and_then(|idx| workbook.worksheet(idx))
}
