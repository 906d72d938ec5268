//! Style pool for deduplication

use super::CellStyle;
use ahash::AHashMap;

/// Style pool for deduplicating styles
///
/// Workbooks typically paint hundreds of cells with a handful of fills.
/// The style pool stores each unique style once and cells reference styles
/// by index.
#[derive(Debug)]
pub struct StylePool {
    /// All unique styles (index 0 is default)
    styles: Vec<CellStyle>,
    /// Fast lookup for deduplication
    index_map: AHashMap<CellStyle, u32>,
}

impl StylePool {
    /// Create a new style pool with default style at index 0
    pub fn new() -> Self {
        let mut pool = Self {
            styles: Vec::with_capacity(16),
            index_map: AHashMap::with_capacity(16),
        };

        let default = CellStyle::default();
        pool.index_map.insert(default.clone(), 0);
        pool.styles.push(default);

        pool
    }

    /// Get or create a style, returning its index
    pub fn get_or_insert(&mut self, style: CellStyle) -> u32 {
        if let Some(&idx) = self.index_map.get(&style) {
            return idx;
        }

        let idx = self.styles.len() as u32;
        self.index_map.insert(style.clone(), idx);
        self.styles.push(style);
        idx
    }

    /// Get a style by index
    pub fn get(&self, index: u32) -> Option<&CellStyle> {
        self.styles.get(index as usize)
    }

    /// Get the number of styles, including the default
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Check if the pool only has the default style
    pub fn is_empty(&self) -> bool {
        self.styles.len() <= 1
    }
}

impl Default for StylePool {
    fn default() -> Self {
        Self::new()
    }
}
