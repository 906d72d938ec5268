//! Date detection: the per-cell classifier, the date row locator and the
//! column mapper built on it.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Utc};
use lazy_regex::{lazy_regex, Lazy};
use regex::Regex;
use rota_core::CellValue;

use crate::block::SiteBlock;
use crate::bounds::UsedBounds;
use crate::config::GasConfig;
use crate::grid::{Grid, GridCell};

/// Days between Excel's 1900 epoch (1899-12-30) and 1970-01-01
pub const EXCEL_UNIX_EPOCH_OFFSET: f64 = 25_569.0;

static DAY_MONTH_YEAR: Lazy<Regex> =
    lazy_regex!(r"\b(\d{1,2})[./-](\d{1,2})[./-](\d{4}|\d{2})\b");

static ORDINAL_SUFFIX: Lazy<Regex> = lazy_regex!(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b");

/// Layouts tried by [`parse_general_date`]. Month and weekday specifiers
/// accept both short and long names when parsing.
const GENERAL_DATE_FORMATS: &[&str] = &[
    "%d %B %Y",
    "%A %d %B %Y",
    "%B %d %Y",
    "%A %B %d %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d %b %y",
];

/// A column of the date row and the date heading it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateColumn {
    pub col: u16,
    pub date: NaiveDate,
}

impl DateColumn {
    /// The date as `YYYY-MM-DD`
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Convert an Excel 1900-system serial to a calendar date.
///
/// Uses `1970-01-01 + floor(serial - 25569)` days, so any time of day is
/// dropped.
pub fn serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    let days = (serial - EXCEL_UNIX_EPOCH_OFFSET).floor();
    if days.abs() > 3_000_000.0 {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let days = days as i64;
    if days >= 0 {
        epoch.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        epoch.checked_sub_days(Days::new(days.unsigned_abs()))
    }
}

/// Find a `DD/MM/YY(YY)` date anywhere in the text.
///
/// `.` and `-` work as separators too. Two-digit years are taken as 20YY.
/// Impossible dates such as 31/02 are rejected.
pub fn parse_day_month_year(text: &str) -> Option<NaiveDate> {
    let caps = DAY_MONTH_YEAR.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let mut year: i32 = caps[3].parse().ok()?;
    if caps[3].len() == 2 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Last-resort parse of free-form date text ("Monday 16th June 2025",
/// "2025-06-16", RFC 3339 timestamps, ...).
///
/// Only dates in years strictly after `min_year` are accepted, which keeps
/// stray numbers and codes from being read as ancient dates.
pub fn parse_general_date(text: &str, min_year: i32) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let date = DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S")
                .map(|dt| dt.date())
                .ok()
        })
        .or_else(|| {
            let cleaned = ORDINAL_SUFFIX.replace_all(text, "$1").replace(',', " ");
            let cleaned = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
            GENERAL_DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        })?;

    (date.year() > min_year).then_some(date)
}

/// Decide whether a cell holds a date, and which one.
///
/// In priority order: a native date value; a number inside the serial-date
/// window; `DD/MM/YYYY`-style text; free-form date text after `min_general_date_year`.
pub fn classify_date_cell(cell: &GridCell, config: &GasConfig) -> Option<NaiveDate> {
    match cell.value.effective_value() {
        CellValue::DateTime(dt) => return Some(dt.date()),
        CellValue::Number(n) if (config.serial_date_min..=config.serial_date_max).contains(n) => {
            return serial_to_date(*n);
        }
        _ => {}
    }

    let text = cell.text.trim();
    if text.is_empty() {
        return None;
    }
    parse_day_month_year(text).or_else(|| parse_general_date(text, config.min_general_date_year))
}

/// Longest run of adjacent date-like cells on a row, across the used columns
pub fn longest_date_run(grid: &dyn Grid, row: u32, bounds: &UsedBounds, config: &GasConfig) -> usize {
    let mut best = 0;
    let mut run = 0;
    for col in bounds.cols() {
        if classify_date_cell(&grid.cell_at(row, col), config).is_some() {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }
    }
    best
}

/// First row of the block whose longest date run reaches `min_date_run`
pub fn locate_date_row(
    grid: &dyn Grid,
    block: &SiteBlock,
    bounds: &UsedBounds,
    config: &GasConfig,
) -> Option<u32> {
    block
        .rows()
        .find(|&row| longest_date_run(grid, row, bounds, config) >= config.min_date_run)
}

/// Every date-like cell of the date row, left to right
pub fn map_date_columns(
    grid: &dyn Grid,
    row: u32,
    bounds: &UsedBounds,
    config: &GasConfig,
) -> Vec<DateColumn> {
    bounds
        .cols()
        .filter_map(|col| {
            classify_date_cell(&grid.cell_at(row, col), config).map(|date| DateColumn { col, date })
        })
        .collect()
}
