//! Parser output records
//!
//! [`ParseResult`] is the only thing downstream consumers see: the shifts
//! that were recovered and the failures that explain what was not.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Which workbook layout an import request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ImportType {
    /// Fixed-grid layout, handled elsewhere
    Build,
    /// Colour-coded freeform layout
    Gas,
}

impl ImportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportType::Build => "BUILD",
            ImportType::Gas => "GAS",
        }
    }
}

impl fmt::Display for ImportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUILD" => Ok(ImportType::Build),
            "GAS" => Ok(ImportType::Gas),
            other => Err(format!("unknown import type '{}'", other)),
        }
    }
}

/// Part of the day a shift covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShiftType {
    #[serde(rename = "am")]
    Am,
    #[serde(rename = "pm")]
    Pm,
    #[default]
    #[serde(rename = "all-day")]
    AllDay,
}

/// Where in the workbook a shift was read from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSource {
    pub sheet_name: String,
    pub cell_ref: String,
}

/// One operative on one site on one date, as found in the sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawParsedShift {
    pub site_address: String,
    /// Serialized as `YYYY-MM-DD`
    pub shift_date: NaiveDate,
    pub operative_name_raw: String,
    pub task: String,
    #[serde(rename = "type")]
    pub shift_type: ShiftType,
    pub department: String,
    pub import_type: ImportType,
    pub source: ShiftSource,
}

/// Why part of a sheet could not be imported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureReason {
    /// The workbook has no worksheets
    NoWorksheetFound,
    /// The selected sheet has no text and no fill anywhere
    SheetAppearsEmpty,
    /// Fewer than two divider rows, so no site block is bounded
    InsufficientDividers,
    /// No cell in a block scored as an address
    AddressNotFound,
    /// No row in a block holds enough consecutive dates
    DateRowNotFound,
    /// The date row produced no date columns
    NoDateColumnsFound,
}

impl FailureReason {
    /// Whether this reason aborts the whole sheet rather than one block
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FailureReason::NoWorksheetFound
                | FailureReason::SheetAppearsEmpty
                | FailureReason::InsufficientDividers
        )
    }
}

/// A part of the sheet that could not be turned into shifts
///
/// Every field apart from the reason and message is optional; a failure
/// carries whatever context was known when it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub reason: FailureReason,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operative_name_raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cell_ref: Option<String>,
}

impl ImportFailure {
    pub fn new<S: Into<String>>(reason: FailureReason, message: S) -> Self {
        Self {
            reason,
            message: message.into(),
            site_address: None,
            shift_date: None,
            operative_name_raw: None,
            sheet_name: None,
            cell_ref: None,
        }
    }

    pub fn with_sheet<S: Into<String>>(mut self, sheet_name: S) -> Self {
        self.sheet_name = Some(sheet_name.into());
        self
    }

    pub fn with_cell_ref<S: Into<String>>(mut self, cell_ref: S) -> Self {
        self.cell_ref = Some(cell_ref.into());
        self
    }

    pub fn with_site_address<S: Into<String>>(mut self, site_address: S) -> Self {
        self.site_address = Some(site_address.into());
        self
    }
}

/// Renders as `sheet!cell: message`, dropping whichever location is unknown
impl fmt::Display for ImportFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.sheet_name, &self.cell_ref) {
            (Some(sheet), Some(cell)) => write!(f, "{}!{}: ", sheet, cell)?,
            (Some(sheet), None) => write!(f, "{}: ", sheet)?,
            (None, Some(cell)) => write!(f, "{}: ", cell)?,
            (None, None) => {}
        }
        f.write_str(&self.message)?;
        if let Some(address) = &self.site_address {
            write!(f, " (site: {})", address)?;
        }
        Ok(())
    }
}

/// Shifts recovered from a sheet plus the failures met on the way
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResult {
    pub parsed: Vec<RawParsedShift>,
    pub failures: Vec<ImportFailure>,
}

impl ParseResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// A result holding a single failure and no shifts
    pub fn failed(failure: ImportFailure) -> Self {
        Self {
            parsed: Vec::new(),
            failures: vec![failure],
        }
    }

    /// No shifts and no failures
    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty() && self.failures.is_empty()
    }

    pub fn shift_count(&self) -> usize {
        self.parsed.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Append another result, keeping both lists in order
    pub fn merge(&mut self, other: ParseResult) {
        self.parsed.extend(other.parsed);
        self.failures.extend(other.failures);
    }
}
