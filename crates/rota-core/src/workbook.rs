//! Workbook type - the main document structure

use crate::error::{Error, Result};
use crate::worksheet::Worksheet;
use crate::MAX_SHEET_NAME_LEN;

/// A workbook (spreadsheet document)
///
/// A workbook contains zero or more worksheets in tab order and the
/// settings needed to interpret their values.
#[derive(Debug, Default)]
pub struct Workbook {
    /// Worksheets in the workbook
    worksheets: Vec<Worksheet>,
    /// Workbook settings
    settings: WorkbookSettings,
}

impl Workbook {
    /// Create a new workbook with one worksheet named "Sheet1"
    pub fn new() -> Self {
        let mut wb = Self::empty();
        wb.worksheets.push(Worksheet::new("Sheet1"));
        wb
    }

    /// Create an empty workbook with no worksheets
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the number of worksheets
    pub fn sheet_count(&self) -> usize {
        self.worksheets.len()
    }

    /// Check if the workbook has no worksheets
    pub fn is_empty(&self) -> bool {
        self.worksheets.is_empty()
    }

    /// Get a worksheet by index
    pub fn worksheet(&self, index: usize) -> Option<&Worksheet> {
        self.worksheets.get(index)
    }

    /// Get a mutable worksheet by index
    pub fn worksheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.worksheets.get_mut(index)
    }

    /// Get a worksheet by exact name
    pub fn worksheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.worksheets.iter().find(|ws| ws.name() == name)
    }

    /// Get the index of a worksheet by exact name
    pub fn sheet_index(&self, name: &str) -> Option<usize> {
        self.worksheets.iter().position(|ws| ws.name() == name)
    }

    /// Iterate over all worksheets in tab order
    pub fn worksheets(&self) -> impl Iterator<Item = &Worksheet> {
        self.worksheets.iter()
    }

    /// Add a new worksheet with specified name
    pub fn add_worksheet_with_name(&mut self, name: &str) -> Result<usize> {
        self.validate_sheet_name(name)?;

        let index = self.worksheets.len();
        self.worksheets.push(Worksheet::new(name));
        Ok(index)
    }

    /// Get workbook settings
    pub fn settings(&self) -> &WorkbookSettings {
        &self.settings
    }

    /// Get mutable workbook settings
    pub fn settings_mut(&mut self) -> &mut WorkbookSettings {
        &mut self.settings
    }

    fn validate_sheet_name(&self, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::InvalidSheetName("Sheet name cannot be empty".into()));
        }
        if name.chars().count() > MAX_SHEET_NAME_LEN {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name too long (max {} characters)",
                MAX_SHEET_NAME_LEN
            )));
        }

        const INVALID_CHARS: &[char] = &[':', '\\', '/', '?', '*', '[', ']'];
        if let Some(c) = name.chars().find(|c| INVALID_CHARS.contains(c)) {
            return Err(Error::InvalidSheetName(format!(
                "Sheet name cannot contain '{}'",
                c
            )));
        }

        // Excel compares sheet names case-insensitively
        let name_lower = name.to_lowercase();
        if self
            .worksheets
            .iter()
            .any(|ws| ws.name().to_lowercase() == name_lower)
        {
            return Err(Error::DuplicateSheetName(name.to_string()));
        }

        Ok(())
    }
}

/// Workbook-level settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkbookSettings {
    /// Serial dates count from 1904-01-01 instead of 1899-12-30
    pub date_1904: bool,
}
