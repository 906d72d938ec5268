//! Site block segmentation

use std::ops::RangeInclusive;

use crate::grid::{Grid, GridCell};

/// Rows belonging to one site, strictly between two divider rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteBlock {
    pub start_row: u32,
    pub end_row: u32,
}

impl SiteBlock {
    pub fn rows(&self) -> RangeInclusive<u32> {
        self.start_row..=self.end_row
    }

    pub fn contains(&self, row: u32) -> bool {
        self.rows().contains(&row)
    }

    /// Reference to the first cell of the block, for failure reports
    pub fn anchor_ref(&self) -> String {
        GridCell::blank(self.start_row, 0).cell_ref()
    }

    /// True when no cell of the block within `cols` holds text
    pub fn is_blank(&self, grid: &dyn Grid, cols: RangeInclusive<u16>) -> bool {
        self.rows()
            .all(|row| cols.clone().all(|col| !grid.cell_at(row, col).has_text()))
    }
}

/// Split the sheet at consecutive divider rows.
///
/// Block `i` spans `dividers[i] + 1 ..= dividers[i + 1] - 1`. Spans with
/// `end_row <= start_row` are dropped without a failure: an empty gap
/// between two dividers is not an error.
pub fn segment_blocks(dividers: &[u32]) -> Vec<SiteBlock> {
    dividers
        .windows(2)
        .filter_map(|pair| {
            let start_row = pair[0].checked_add(1)?;
            let end_row = pair[1].checked_sub(1)?;
            (end_row > start_row).then_some(SiteBlock { start_row, end_row })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::{Color, Worksheet};

    #[test]
    fn test_segment_blocks() {
        let blocks = segment_blocks(&[0, 5, 12]);
        assert_eq!(
            blocks,
            vec![
                SiteBlock {
                    start_row: 1,
                    end_row: 4
                },
                SiteBlock {
                    start_row: 6,
                    end_row: 11
                },
            ]
        );
        assert_eq!(blocks[1].anchor_ref(), "A7");
        assert!(blocks[0].contains(4));
        assert!(!blocks[0].contains(5));
    }

    #[test]
    fn test_narrow_gaps_are_skipped() {
        assert!(segment_blocks(&[]).is_empty());
        assert!(segment_blocks(&[3]).is_empty());
        // Adjacent, one-row and two-row gaps
        assert!(segment_blocks(&[3, 4]).is_empty());
        assert!(segment_blocks(&[3, 5]).is_empty());
        assert_eq!(segment_blocks(&[3, 6]).len(), 1);
    }

    #[test]
    fn test_blank_block() {
        let mut ws = Worksheet::new("UNITAS");
        ws.set_cell_value_at(2, 4, "   ").unwrap();
        ws.set_cell_fill_at(3, 1, Color::YELLOW).unwrap();
        let block = SiteBlock {
            start_row: 1,
            end_row: 3,
        };
        assert!(block.is_blank(&ws, 0..=5));

        ws.set_cell_value_at(3, 5, "Ann").unwrap();
        assert!(!block.is_blank(&ws, 0..=5));
        assert!(block.is_blank(&ws, 0..=4));
    }
}
