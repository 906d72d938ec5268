//! Fill/background style types

use super::Color;

/// Fill style for cell background
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FillStyle {
    /// No fill (transparent)
    #[default]
    None,

    /// Solid color fill
    Solid { color: Color },

    /// Pattern fill
    Pattern {
        pattern: PatternType,
        foreground: Color,
        background: Color,
    },

    /// Gradient fill, reduced to its stop colours
    Gradient { stops: Vec<Color> },
}

impl FillStyle {
    /// Create a solid fill with the given color
    pub fn solid(color: Color) -> Self {
        FillStyle::Solid { color }
    }

    /// Check if this is a "no fill"
    pub fn is_none(&self) -> bool {
        matches!(self, FillStyle::None)
    }

    /// The colour that paints the cell, if any.
    ///
    /// Pattern fills report their foreground colour (the one Excel's fill
    /// picker shows); gradients report their first stop.
    pub fn color(&self) -> Option<Color> {
        match self {
            FillStyle::None => None,
            FillStyle::Solid { color } => Some(*color),
            FillStyle::Pattern { foreground, .. } => Some(*foreground),
            FillStyle::Gradient { stops } => stops.first().copied(),
        }
    }
}

/// Pattern fill types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PatternType {
    /// No pattern
    #[default]
    None,
    /// Solid (100% foreground)
    Solid,
    MediumGray,
    DarkGray,
    LightGray,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
    /// 12.5% gray, the reserved fill at index 1 of every styles.xml
    Gray125,
    Gray0625,
}

impl PatternType {
    /// Parse the `patternType` attribute of a `<patternFill>` element
    pub fn from_xlsx(s: &str) -> Option<Self> {
        Some(match s {
            "none" => PatternType::None,
            "solid" => PatternType::Solid,
            "mediumGray" => PatternType::MediumGray,
            "darkGray" => PatternType::DarkGray,
            "lightGray" => PatternType::LightGray,
            "darkHorizontal" => PatternType::DarkHorizontal,
            "darkVertical" => PatternType::DarkVertical,
            "darkDown" => PatternType::DarkDown,
            "darkUp" => PatternType::DarkUp,
            "darkGrid" => PatternType::DarkGrid,
            "darkTrellis" => PatternType::DarkTrellis,
            "lightHorizontal" => PatternType::LightHorizontal,
            "lightVertical" => PatternType::LightVertical,
            "lightDown" => PatternType::LightDown,
            "lightUp" => PatternType::LightUp,
            "lightGrid" => PatternType::LightGrid,
            "lightTrellis" => PatternType::LightTrellis,
            "gray125" => PatternType::Gray125,
            "gray0625" => PatternType::Gray0625,
            _ => return None,
        })
    }
}
