//! Cell styling types
//!
//! Only the parts of a cell's formatting that carry meaning for an import are
//! modelled:
//! - [`FillStyle`] - Background fill (used as structure by colour-coded sheets)
//! - [`NumberFormat`] - Decides whether a stored number is really a date
//! - [`Color`] - Color representation

mod color;
mod fill;
mod number_format;
mod pool;

pub use color::Color;
pub use fill::{FillStyle, PatternType};
pub use number_format::NumberFormat;
pub use pool::StylePool;

/// Cell style
///
/// Styles are deduplicated via [`StylePool`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct CellStyle {
    /// Fill/background settings
    pub fill: FillStyle,
    /// Number format
    pub number_format: NumberFormat,
}

impl CellStyle {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill
    pub fn with_fill(mut self, fill: FillStyle) -> Self {
        self.fill = fill;
        self
    }

    /// Set a solid fill colour
    pub fn fill_color(self, color: Color) -> Self {
        self.with_fill(FillStyle::solid(color))
    }

    /// Set the number format
    pub fn with_number_format(mut self, format: NumberFormat) -> Self {
        self.number_format = format;
        self
    }

    /// Check if this is the default style
    pub fn is_default(&self) -> bool {
        *self == CellStyle::default()
    }
}
