//! Operative name scanning
//!
//! Below each date heading sit the names of the operatives working that day,
//! mixed in with sheet furniture ("Job Manager"), phone numbers and cells
//! holding several names at once.

use lazy_regex::{lazy_regex, Lazy};
use regex::Regex;

use crate::block::SiteBlock;
use crate::config::GasConfig;
use crate::dates::DateColumn;
use crate::divider::DividerRows;
use crate::grid::Grid;

static PHONE_NUMBER: Lazy<Regex> = lazy_regex!(r"^\+?\d[\d\s-]{7,}$");

static NAME_SEPARATOR: Lazy<Regex> = lazy_regex!(r"(?i)[\r\n,&/]|\band\b");

/// One name found under a date heading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedName {
    pub row: u32,
    pub col: u16,
    pub name: String,
}

/// Trim and collapse internal whitespace runs to one space
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A bare phone number such as `07700 900123` or `+44 7700-900-123`
pub fn is_phone_number(text: &str) -> bool {
    PHONE_NUMBER.is_match(text.trim())
}

/// Cell text that is never an operative: blocklisted keywords or a phone number
pub fn is_metadata_text(text: &str, config: &GasConfig) -> bool {
    let lower = normalize_text(text).to_lowercase();
    config
        .blocklist()
        .iter()
        .any(|word| lower.contains(word.as_str()))
        || is_phone_number(text)
}

/// Split a cell into individual names.
///
/// Separators are line breaks, `,`, `&`, `/` and the word "and". Fragments
/// that are empty, "ignore", a phone number or contain a stopword are
/// dropped. Stopwords match as substrings, so a surname such as
/// "Castellano" is lost to "tel".
pub fn split_names(text: &str, config: &GasConfig) -> Vec<String> {
    let stopwords = config.stopwords();

    NAME_SEPARATOR
        .split(text)
        .map(normalize_text)
        .filter(|fragment| {
            if fragment.is_empty()
                || fragment.eq_ignore_ascii_case("ignore")
                || is_phone_number(fragment)
            {
                return false;
            }
            let lower = fragment.to_lowercase();
            !stopwords.iter().any(|word| lower.contains(word.as_str()))
        })
        .collect()
}

/// Collect the names below one date heading.
///
/// Scans from the row after the date row down to the block end, stopping at
/// a divider row or after `blank_run_limit` blank cells in a row. Metadata
/// cells are skipped but still break a blank run.
pub fn scan_operatives(
    grid: &dyn Grid,
    block: &SiteBlock,
    date_row: u32,
    column: &DateColumn,
    dividers: &DividerRows,
    config: &GasConfig,
) -> Vec<ScannedName> {
    let mut names = Vec::new();
    let mut blank_run = 0;

    let Some(first_row) = date_row.checked_add(1) else {
        return names;
    };

    for row in first_row..=block.end_row {
        if dividers.is_divider(row) {
            break;
        }

        let cell = grid.cell_at(row, column.col);
        if !cell.has_text() {
            blank_run += 1;
            if blank_run >= config.blank_run_limit {
                break;
            }
            continue;
        }
        blank_run = 0;

        if is_metadata_text(&cell.text, config) {
            log::trace!("{}: skipping metadata '{}'", cell.cell_ref(), cell.text.trim());
            continue;
        }

        names.extend(split_names(&cell.text, config).into_iter().map(|name| ScannedName {
            row,
            col: column.col,
            name,
        }));
    }

    names
}
