//! Tunable thresholds and keyword lists
//!
//! The numbers below were chosen empirically against real rota workbooks.
//! They are kept overridable rather than hard-wired so they can be tuned
//! per customer without code changes.

use serde::{Deserialize, Serialize};

use crate::error::ImportError;
use crate::record::ShiftType;

/// Sheet name looked up first when choosing a worksheet
pub const DEFAULT_PREFERRED_SHEET: &str = "UNITAS";
/// Minimum fraction of used columns a divider row must paint
pub const DEFAULT_DIVIDER_FILL_COVERAGE: f64 = 0.70;
/// Minimum fraction of a divider's filled cells sharing its first colour
pub const DEFAULT_DIVIDER_COLOUR_CONSISTENCY: f64 = 0.70;
/// Score an address candidate needs to be accepted
pub const DEFAULT_MIN_ADDRESS_SCORE: u32 = 30;
/// Cap on the text-length part of an address score
pub const DEFAULT_ADDRESS_LENGTH_CAP: u32 = 120;
/// Contiguous date-like cells that make a row the date row
pub const DEFAULT_MIN_DATE_RUN: usize = 3;
/// Consecutive blank cells that end an operative column
pub const DEFAULT_BLANK_RUN_LIMIT: usize = 3;
/// Lowest number read as an Excel serial date (1954-10-03)
pub const DEFAULT_SERIAL_DATE_MIN: f64 = 20_000.0;
/// Highest number read as an Excel serial date (2064-04-08)
pub const DEFAULT_SERIAL_DATE_MAX: f64 = 60_000.0;
/// Free-form dates must fall strictly after this year
pub const DEFAULT_MIN_GENERAL_DATE_YEAR: i32 = 2000;
/// Cell text containing any of these is sheet furniture, not a name
pub const DEFAULT_METADATA_BLOCKLIST: &[&str] =
    &["job manager", "measures", "scheme", "date of shift", "ignore"];
/// Name fragments containing any of these are contact details
pub const DEFAULT_FRAGMENT_STOPWORDS: &[&str] = &["tel", "mobile"];
/// Task recorded on every imported shift
pub const DEFAULT_TASK: &str = "TBC";
/// Department recorded on every imported shift
pub const DEFAULT_DEPARTMENT: &str = "GAS";

/// Configuration for the GAS parser
///
/// Every field falls back to its default when missing from a config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GasConfig {
    pub preferred_sheet: String,
    pub divider_fill_coverage: f64,
    pub divider_colour_consistency: f64,
    pub min_address_score: u32,
    pub address_length_cap: u32,
    pub min_date_run: usize,
    pub blank_run_limit: usize,
    pub serial_date_min: f64,
    pub serial_date_max: f64,
    pub min_general_date_year: i32,
    pub metadata_blocklist: Vec<String>,
    pub fragment_stopwords: Vec<String>,
    pub default_task: String,
    pub default_department: String,
    pub default_shift_type: ShiftType,
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            preferred_sheet: DEFAULT_PREFERRED_SHEET.to_string(),
            divider_fill_coverage: DEFAULT_DIVIDER_FILL_COVERAGE,
            divider_colour_consistency: DEFAULT_DIVIDER_COLOUR_CONSISTENCY,
            min_address_score: DEFAULT_MIN_ADDRESS_SCORE,
            address_length_cap: DEFAULT_ADDRESS_LENGTH_CAP,
            min_date_run: DEFAULT_MIN_DATE_RUN,
            blank_run_limit: DEFAULT_BLANK_RUN_LIMIT,
            serial_date_min: DEFAULT_SERIAL_DATE_MIN,
            serial_date_max: DEFAULT_SERIAL_DATE_MAX,
            min_general_date_year: DEFAULT_MIN_GENERAL_DATE_YEAR,
            metadata_blocklist: DEFAULT_METADATA_BLOCKLIST
                .iter()
                .map(|s| s.to_string())
                .collect(),
            fragment_stopwords: DEFAULT_FRAGMENT_STOPWORDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_task: DEFAULT_TASK.to_string(),
            default_department: DEFAULT_DEPARTMENT.to_string(),
            default_shift_type: ShiftType::AllDay,
        }
    }
}

impl GasConfig {
    /// Parse a JSON config document; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, ImportError> {
        let config: GasConfig = serde_json::from_str(json)
            .map_err(|e| ImportError::Config(format!("invalid config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject thresholds the pipeline cannot work with
    pub fn validate(&self) -> Result<(), ImportError> {
        for (name, ratio) in [
            ("dividerFillCoverage", self.divider_fill_coverage),
            ("dividerColourConsistency", self.divider_colour_consistency),
        ] {
            if !(0.0..=1.0).contains(&ratio) {
                return Err(ImportError::Config(format!(
                    "{} must be between 0 and 1, got {}",
                    name, ratio
                )));
            }
        }

        if self.min_date_run == 0 {
            return Err(ImportError::Config("minDateRun must be at least 1".into()));
        }
        if self.blank_run_limit == 0 {
            return Err(ImportError::Config(
                "blankRunLimit must be at least 1".into(),
            ));
        }
        let window = self.serial_date_min..=self.serial_date_max;
        if window.is_empty() {
            return Err(ImportError::Config(format!(
                "serial date window is inverted ({}..{})",
                self.serial_date_min, self.serial_date_max
            )));
        }

        Ok(())
    }

    /// Lowercased, trimmed blocklist entries, empty ones dropped
    pub(crate) fn blocklist(&self) -> Vec<String> {
        normalized_keywords(&self.metadata_blocklist)
    }

    /// Lowercased, trimmed stopwords, empty ones dropped
    pub(crate) fn stopwords(&self) -> Vec<String> {
        normalized_keywords(&self.fragment_stopwords)
    }
}

fn normalized_keywords(words: &[String]) -> Vec<String> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
