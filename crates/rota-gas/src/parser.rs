//! The GAS pipeline and its entry points
//!
//! Stages run strictly in order over one sheet: used bounds, divider rows,
//! site blocks, then per block the address, date row, date columns and the
//! operatives under each date. Every stage returns plain data consumed by
//! the next one.

use rota_core::{CellAddress, Workbook};
use rota_xlsx::XlsxReader;

use crate::address::{extract_address, AddressCandidate};
use crate::block::{segment_blocks, SiteBlock};
use crate::bounds::{used_bounds, UsedBounds};
use crate::config::GasConfig;
use crate::dates::{locate_date_row, map_date_columns, DateColumn};
use crate::divider::{find_divider_rows, DividerRows};
use crate::error::ImportError;
use crate::grid::Grid;
use crate::names::scan_operatives;
use crate::record::{
    FailureReason, ImportFailure, ImportType, ParseResult, RawParsedShift, ShiftSource,
};
use crate::sheet::select_worksheet;

/// Structure detected in a sheet, before any names are read
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    pub sheet_name: String,
    pub bounds: UsedBounds,
    pub dividers: DividerRows,
    pub blocks: Vec<BlockLayout>,
}

/// What was found inside one site block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockLayout {
    pub block: SiteBlock,
    pub address: Option<AddressCandidate>,
    pub date_row: Option<u32>,
    /// Empty when no date row was found
    pub date_columns: Vec<DateColumn>,
}

/// Parser for colour-coded GAS rota sheets
#[derive(Debug, Clone, Default)]
pub struct GasParser {
    config: GasConfig,
}

impl GasParser {
    /// Create a parser, rejecting an unusable configuration
    pub fn new(config: GasConfig) -> Result<Self, ImportError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GasConfig {
        &self.config
    }

    /// Load an XLSX buffer and parse its selected sheet.
    ///
    /// Only an unreadable buffer is an error; everything else is reported
    /// through [`ParseResult::failures`].
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<ParseResult, ImportError> {
        let workbook = XlsxReader::read_bytes(bytes)?;
        Ok(self.parse_workbook(&workbook))
    }

    /// Select the sheet to parse and parse it
    pub fn parse_workbook(&self, workbook: &Workbook) -> ParseResult {
        match select_worksheet(workbook, &self.config.preferred_sheet) {
            Some(sheet) => self.parse_sheet(sheet),
            None => {
                let failure = ImportFailure::new(
                    FailureReason::NoWorksheetFound,
                    "workbook contains no worksheets",
                );
                log::warn!("{}", failure);
                ParseResult::failed(failure)
            }
        }
    }

    /// Parse one sheet into shifts and failures
    pub fn parse_sheet(&self, grid: &dyn Grid) -> ParseResult {
        let layout = match self.analyze(grid) {
            Ok(layout) => layout,
            Err(failure) => {
                log::warn!("{}", failure);
                return ParseResult::failed(failure);
            }
        };

        let mut result = ParseResult::new();
        for block in &layout.blocks {
            result.merge(self.parse_block(grid, &layout, block));
        }

        log::info!(
            "{}: {} blocks, {} shifts, {} failures",
            layout.sheet_name,
            layout.blocks.len(),
            result.shift_count(),
            result.failure_count()
        );
        result
    }

    /// Detect the sheet structure without reading any names.
    ///
    /// Fails with the sheet-level failure that would abort a parse: an
    /// empty sheet or fewer than two divider rows.
    pub fn analyze(&self, grid: &dyn Grid) -> Result<SheetLayout, ImportFailure> {
        let sheet_name = grid.sheet_name().to_string();

        let bounds = used_bounds(grid).ok_or_else(|| {
            ImportFailure::new(
                FailureReason::SheetAppearsEmpty,
                "sheet has no text or filled cells",
            )
            .with_sheet(sheet_name.as_str())
        })?;
        log::debug!("{}: used range {}", sheet_name, bounds.to_range());

        let dividers = find_divider_rows(grid, &bounds, &self.config);
        if dividers.len() < 2 {
            return Err(ImportFailure::new(
                FailureReason::InsufficientDividers,
                format!(
                    "found {} divider row(s), at least 2 are needed to bound a site",
                    dividers.len()
                ),
            )
            .with_sheet(sheet_name.as_str()));
        }

        // Textless gaps between dividers are spacing, not failed sites
        let blocks = segment_blocks(&dividers.collapsed)
            .into_iter()
            .filter(|block| {
                let blank = block.is_blank(grid, bounds.cols());
                if blank {
                    log::debug!(
                        "{}: skipping empty rows {}-{}",
                        sheet_name,
                        block.start_row + 1,
                        block.end_row + 1
                    );
                }
                !blank
            })
            .map(|block| self.inspect_block(grid, &bounds, block))
            .collect();

        Ok(SheetLayout {
            sheet_name,
            bounds,
            dividers,
            blocks,
        })
    }

    fn inspect_block(&self, grid: &dyn Grid, bounds: &UsedBounds, block: SiteBlock) -> BlockLayout {
        let address = extract_address(grid, &block, &self.config);
        let date_row = locate_date_row(grid, &block, bounds, &self.config);
        let date_columns = date_row
            .map(|row| map_date_columns(grid, row, bounds, &self.config))
            .unwrap_or_default();

        log::debug!(
            "{}: block rows {}-{}, address {:?}, date row {:?}, {} date columns",
            grid.sheet_name(),
            block.start_row + 1,
            block.end_row + 1,
            address.as_ref().map(|a| a.text.as_str()),
            date_row.map(|r| r + 1),
            date_columns.len()
        );

        BlockLayout {
            block,
            address,
            date_row,
            date_columns,
        }
    }

    fn parse_block(&self, grid: &dyn Grid, layout: &SheetLayout, detail: &BlockLayout) -> ParseResult {
        let block = &detail.block;
        let sheet_name = layout.sheet_name.as_str();

        let Some(address) = &detail.address else {
            let failure = ImportFailure::new(
                FailureReason::AddressNotFound,
                format!(
                    "no site address found in rows {}-{}",
                    block.start_row + 1,
                    block.end_row + 1
                ),
            )
            .with_sheet(sheet_name)
            .with_cell_ref(block.anchor_ref());
            log::warn!("{}", failure);
            return ParseResult::failed(failure);
        };

        let Some(date_row) = detail.date_row else {
            let failure = ImportFailure::new(
                FailureReason::DateRowNotFound,
                format!(
                    "no row with {} or more consecutive dates",
                    self.config.min_date_run
                ),
            )
            .with_sheet(sheet_name)
            .with_cell_ref(block.anchor_ref())
            .with_site_address(address.text.as_str());
            log::warn!("{}", failure);
            return ParseResult::failed(failure);
        };

        if detail.date_columns.is_empty() {
            let failure = ImportFailure::new(
                FailureReason::NoDateColumnsFound,
                "date row has no date columns",
            )
            .with_sheet(sheet_name)
            .with_cell_ref(CellAddress::new(date_row, 0).to_a1_string())
            .with_site_address(address.text.as_str());
            log::warn!("{}", failure);
            return ParseResult::failed(failure);
        }

        let mut result = ParseResult::new();
        for column in &detail.date_columns {
            let names = scan_operatives(
                grid,
                block,
                date_row,
                column,
                &layout.dividers,
                &self.config,
            );
            result.parsed.extend(names.into_iter().map(|found| RawParsedShift {
                site_address: address.text.clone(),
                shift_date: column.date,
                operative_name_raw: found.name,
                task: self.config.default_task.clone(),
                shift_type: self.config.default_shift_type,
                department: self.config.default_department.clone(),
                import_type: ImportType::Gas,
                source: ShiftSource {
                    sheet_name: sheet_name.to_string(),
                    cell_ref: CellAddress::new(found.row, found.col).to_a1_string(),
                },
            }));
        }
        result
    }
}

/// Parse a loaded workbook with the default configuration
pub fn parse_gas_workbook(workbook: &Workbook) -> ParseResult {
    GasParser::default().parse_workbook(workbook)
}

/// Parse an XLSX buffer with the default configuration
pub fn parse_gas_bytes(bytes: &[u8]) -> Result<ParseResult, ImportError> {
    GasParser::default().parse_bytes(bytes)
}

/// Parse one sheet with the default configuration
pub fn parse_sheet(grid: &dyn Grid) -> ParseResult {
    GasParser::default().parse_sheet(grid)
}

/// Route an import request by layout type.
///
/// Only [`ImportType::Gas`] is handled here; the type is checked before the
/// buffer is touched.
pub fn parse_workbook_by_type(
    bytes: &[u8],
    import_type: ImportType,
    config: &GasConfig,
) -> Result<ParseResult, ImportError> {
    match import_type {
        ImportType::Gas => GasParser::new(config.clone())?.parse_bytes(bytes),
        ImportType::Build => Err(ImportError::UnsupportedImportType(import_type)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rota_core::{Color, Worksheet};

    const WIDTH: u16 = 5;

    fn paint_divider(ws: &mut Worksheet, row: u32) {
        for col in 0..WIDTH {
            ws.set_cell_fill_at(row, col, Color::GRAY).unwrap();
        }
    }

    /// Two sites between three dividers; the second site has no dates
    fn rota_sheet() -> Worksheet {
        let mut ws = Worksheet::new("UNITAS");
        paint_divider(&mut ws, 0);
        ws.set_cell_value_at(1, 0, "12 High Street, Leeds LS1 4AB").unwrap();
        ws.set_cell_fill_at(1, 0, Color::YELLOW).unwrap();
        ws.set_cell_value_at(2, 1, "16/06/2025").unwrap();
        ws.set_cell_value_at(2, 2, "17/06/2025").unwrap();
        ws.set_cell_value_at(2, 3, "18/06/2025").unwrap();
        ws.set_cell_value_at(3, 1, "John Smith, Jane Doe").unwrap();
        ws.set_cell_value_at(3, 3, "Job Manager").unwrap();
        ws.set_cell_value_at(4, 3, "Ali Khan").unwrap();
        paint_divider(&mut ws, 5);
        ws.set_cell_value_at(6, 0, "7 Mill Lane, Hull HU1 2AA").unwrap();
        ws.set_cell_value_at(7, 1, "Nobody").unwrap();
        paint_divider(&mut ws, 8);
        ws
    }

    #[test]
    fn test_parse_sheet() {
        let result = parse_sheet(&rota_sheet());

        let shifts: Vec<_> = result
            .parsed
            .iter()
            .map(|s| {
                (
                    s.operative_name_raw.as_str(),
                    s.shift_date.to_string(),
                    s.source.cell_ref.as_str(),
                )
            })
            .collect();
        assert_eq!(
            shifts,
            vec![
                ("John Smith", "2025-06-16".to_string(), "B4"),
                ("Jane Doe", "2025-06-16".to_string(), "B4"),
                ("Ali Khan", "2025-06-18".to_string(), "D5"),
            ]
        );
        assert!(result
            .parsed
            .iter()
            .all(|s| s.site_address == "12 High Street, Leeds LS1 4AB"
                && s.task == "TBC"
                && s.department == "GAS"));

        assert_eq!(result.failures.len(), 1);
        let failure = &result.failures[0];
        assert_eq!(failure.reason, FailureReason::DateRowNotFound);
        assert_eq!(failure.cell_ref.as_deref(), Some("A7"));
        assert_eq!(failure.site_address.as_deref(), Some("7 Mill Lane, Hull HU1 2AA"));
    }

    #[test]
    fn test_analyze_layout() {
        let layout = GasParser::default().analyze(&rota_sheet()).unwrap();
        assert_eq!(layout.dividers.collapsed, vec![0, 5, 8]);
        assert_eq!(layout.blocks.len(), 2);
        assert_eq!(layout.blocks[0].date_row, Some(2));
        assert_eq!(
            layout.blocks[0].date_columns[0].date,
            NaiveDate::from_ymd_opt(2025, 6, 16).unwrap()
        );
        assert_eq!(layout.blocks[1].date_row, None);
        assert!(layout.blocks[1].date_columns.is_empty());
    }

    #[test]
    fn test_missing_address() {
        let mut ws = Worksheet::new("UNITAS");
        paint_divider(&mut ws, 0);
        ws.set_cell_value_at(1, 0, "Site").unwrap();
        ws.set_cell_value_at(2, 2, "Ann").unwrap();
        paint_divider(&mut ws, 3);

        let result = parse_sheet(&ws);
        assert!(result.parsed.is_empty());
        assert_eq!(result.failures[0].reason, FailureReason::AddressNotFound);
        assert_eq!(result.failures[0].to_string(), "UNITAS!A2: no site address found in rows 2-3");
    }

    #[test]
    fn test_fatal_conditions() {
        let empty = parse_sheet(&Worksheet::new("UNITAS"));
        assert_eq!(empty.failures[0].reason, FailureReason::SheetAppearsEmpty);
        assert!(empty.failures[0].reason.is_fatal());

        let mut one_divider = Worksheet::new("UNITAS");
        paint_divider(&mut one_divider, 0);
        one_divider.set_cell_value_at(1, 0, "12 High Street, Leeds").unwrap();
        let result = parse_sheet(&one_divider);
        assert_eq!(result.failure_count(), 1);
        assert_eq!(result.failures[0].reason, FailureReason::InsufficientDividers);
        assert_eq!(result.failures[0].sheet_name.as_deref(), Some("UNITAS"));

        let result = parse_gas_workbook(&Workbook::empty());
        assert_eq!(result.failures[0].reason, FailureReason::NoWorksheetFound);
    }

    #[test]
    fn test_config_defaults_flow_into_shifts() {
        let config = GasConfig {
            default_task: "Survey".into(),
            default_shift_type: crate::record::ShiftType::Am,
            ..GasConfig::default()
        };
        let result = GasParser::new(config).unwrap().parse_sheet(&rota_sheet());
        assert!(result
            .parsed
            .iter()
            .all(|s| s.task == "Survey" && s.shift_type == crate::record::ShiftType::Am));
    }

    #[test]
    fn test_build_is_rejected_before_loading() {
        let err = parse_workbook_by_type(b"not a workbook", ImportType::Build, &GasConfig::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedImportType(ImportType::Build)));

        let err = parse_workbook_by_type(b"not a workbook", ImportType::Gas, &GasConfig::default())
            .unwrap_err();
        assert!(matches!(err, ImportError::Load(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = GasConfig {
            min_date_run: 0,
            ..GasConfig::default()
        };
        assert!(matches!(GasParser::new(config), Err(ImportError::Config(_))));
    }
}
