//! Site address extraction
//!
//! The address sits somewhere near the left edge of a block, usually in a
//! painted cell, usually with a house number and often a postcode. Cells
//! are scored on those traits and the best one wins.

use lazy_regex::{lazy_regex, Lazy};
use regex::Regex;

use crate::block::SiteBlock;
use crate::colour::is_white_like;
use crate::config::GasConfig;
use crate::grid::{Grid, GridCell};

/// Bonus for a painted cell
pub const FILL_BONUS: u32 = 15;
/// Bonus for text containing a digit
pub const DIGIT_BONUS: u32 = 10;
/// Bonus for text containing a comma or a line break
pub const SEPARATOR_BONUS: u32 = 10;
/// Bonus for text containing a UK postcode
pub const POSTCODE_BONUS: u32 = 15;

/// Column A
const PRIMARY_COLS: std::ops::RangeInclusive<u16> = 0..=0;
/// Columns A and B
const FALLBACK_COLS: std::ops::RangeInclusive<u16> = 0..=1;

static UK_POSTCODE: Lazy<Regex> = lazy_regex!(r"(?i)[A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}");

/// A scored address cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCandidate {
    /// Normalised address text
    pub text: String,
    pub score: u32,
    pub row: u32,
    pub col: u16,
}

/// Score a piece of cell text as an address
pub fn score_address(text: &str, filled: bool, config: &GasConfig) -> u32 {
    let text = text.trim();
    let mut score = 0;

    if filled {
        score += FILL_BONUS;
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        score += DIGIT_BONUS;
    }
    if text.contains(',') || text.contains('\n') || text.contains('\r') {
        score += SEPARATOR_BONUS;
    }
    if UK_POSTCODE.is_match(text) {
        score += POSTCODE_BONUS;
    }

    let length = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    score + length.min(config.address_length_cap)
}

/// Collapse a multi-line cell into a single `line, line` address
pub fn normalize_address(text: &str) -> String {
    text.split(|c: char| c == '\r' || c == '\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Pick the block's address: column A first, then columns A-B.
///
/// Returns `None` when no cell reaches `min_address_score` in either pass.
pub fn extract_address(
    grid: &dyn Grid,
    block: &SiteBlock,
    config: &GasConfig,
) -> Option<AddressCandidate> {
    best_candidate(grid, block, PRIMARY_COLS, config)
        .or_else(|| best_candidate(grid, block, FALLBACK_COLS, config))
}

fn best_candidate(
    grid: &dyn Grid,
    block: &SiteBlock,
    cols: std::ops::RangeInclusive<u16>,
    config: &GasConfig,
) -> Option<AddressCandidate> {
    let mut best: Option<(GridCell, u32)> = None;

    for row in block.rows() {
        for col in cols.clone() {
            let cell = grid.cell_at(row, col);
            if !cell.has_text() {
                continue;
            }
            let score = score_address(&cell.text, !is_white_like(cell.fill.as_ref()), config);
            // Strictly greater keeps the first of equal scores
            if best.as_ref().map_or(true, |(_, s)| score > *s) {
                best = Some((cell, score));
            }
        }
    }

    let (cell, score) = best?;
    if score < config.min_address_score {
        return None;
    }

    Some(AddressCandidate {
        text: normalize_address(&cell.text),
        score,
        row: cell.row,
        col: cell.col,
    })
}
