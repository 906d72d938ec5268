//! Color representation

use std::fmt;

/// Color as stored in a workbook
///
/// XLSX fills reference colours in several ways (explicit ARGB, theme slot,
/// legacy palette index). They are kept as written so two cells painted the
/// same way compare equal without any colour-space conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// Automatic/default color
    #[default]
    Auto,

    /// RGB color (no alpha)
    Rgb { r: u8, g: u8, b: u8 },

    /// ARGB color with alpha channel
    Argb { a: u8, r: u8, g: u8, b: u8 },

    /// Theme color with tint
    ///
    /// Theme indices:
    /// 0 = Background 1 (light)
    /// 1 = Text 1 (dark)
    /// 2 = Background 2
    /// 3 = Text 2
    /// 4-9 = Accent 1-6
    Theme {
        /// Theme color index (0-9)
        index: u8,
        /// Tint value (-1.0 to 1.0, stored as i8 percentage)
        tint: i8,
    },

    /// Indexed color (legacy Excel palette)
    Indexed(u8),
}

impl Color {
    /// Create an RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color::Rgb { r, g, b }
    }

    /// Create an ARGB color
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Color::Argb { a, r, g, b }
    }

    /// Create a theme color
    pub const fn theme(index: u8, tint: i8) -> Self {
        Color::Theme { index, tint }
    }

    /// Create from a hex string (e.g., "#FF0000", "FF0000" or "FFFF0000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return None;
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();

        match hex.len() {
            6 => Some(Color::Rgb {
                r: byte(0)?,
                g: byte(2)?,
                b: byte(4)?,
            }),
            8 => Some(Color::Argb {
                a: byte(0)?,
                r: byte(2)?,
                g: byte(4)?,
                b: byte(6)?,
            }),
            _ => None,
        }
    }

    /// Alpha channel, when the colour carries one explicitly
    pub fn alpha(&self) -> Option<u8> {
        match self {
            Color::Argb { a, .. } => Some(*a),
            Color::Rgb { .. } => Some(0xFF),
            _ => None,
        }
    }

    /// Stable textual code identifying how the colour was written.
    ///
    /// Explicit colours become 8-digit ARGB hex (`FFFF0000`); theme and
    /// palette references keep their reference form (`theme:4:-25`,
    /// `indexed:10`). Two cells share a code exactly when they were painted
    /// with the same colour reference.
    pub fn code(&self) -> String {
        match self {
            Color::Auto => "auto".to_string(),
            Color::Rgb { r, g, b } => format!("FF{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            Color::Theme { index, tint } => format!("theme:{}:{}", index, tint),
            Color::Indexed(i) => format!("indexed:{}", i),
        }
    }

    /// Convert to ARGB hex string (8 characters), resolving theme and palette colours
    pub fn to_argb_hex(&self) -> String {
        match self {
            Color::Argb { a, r, g, b } => format!("{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            _ => {
                let (r, g, b) = self.to_rgb();
                format!("FF{:02X}{:02X}{:02X}", r, g, b)
            }
        }
    }

    /// Convert to RGB tuple using the default Office theme and palette
    pub fn to_rgb(&self) -> (u8, u8, u8) {
        match self {
            Color::Auto => (0, 0, 0),
            Color::Rgb { r, g, b } => (*r, *g, *b),
            Color::Argb { r, g, b, .. } => (*r, *g, *b),
            Color::Theme { index, tint } => Self::apply_tint(Self::theme_to_rgb(*index), *tint),
            Color::Indexed(i) => Self::indexed_to_rgb(*i),
        }
    }

    /// Get RGB for indexed color. Only the leading palette entries are
    /// tabulated; anything else resolves to black.
    fn indexed_to_rgb(index: u8) -> (u8, u8, u8) {
        const PALETTE: [(u8, u8, u8); 24] = [
            (0, 0, 0),
            (255, 255, 255),
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (255, 255, 0),
            (255, 0, 255),
            (0, 255, 255),
            (0, 0, 0),
            (255, 255, 255),
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (255, 255, 0),
            (255, 0, 255),
            (0, 255, 255),
            (128, 0, 0),
            (0, 128, 0),
            (0, 0, 128),
            (128, 128, 0),
            (128, 0, 128),
            (0, 128, 128),
            (192, 192, 192),
            (128, 128, 128),
        ];

        match index {
            // System foreground / background
            64 => (0, 0, 0),
            65 => (255, 255, 255),
            i => PALETTE.get(i as usize).copied().unwrap_or((0, 0, 0)),
        }
    }

    /// Get RGB for theme color (using default Office theme)
    fn theme_to_rgb(index: u8) -> (u8, u8, u8) {
        match index {
            0 => (255, 255, 255),
            1 => (0, 0, 0),
            2 => (238, 236, 225),
            3 => (31, 73, 125),
            4 => (79, 129, 189),
            5 => (192, 80, 77),
            6 => (155, 187, 89),
            7 => (128, 100, 162),
            8 => (75, 172, 198),
            9 => (247, 150, 70),
            _ => (0, 0, 0),
        }
    }

    fn apply_tint(color: (u8, u8, u8), tint: i8) -> (u8, u8, u8) {
        let tint = tint as f64 / 100.0;

        let apply = |c: u8| -> u8 {
            let c = c as f64;
            let result = if tint < 0.0 {
                c * (1.0 + tint)
            } else {
                c + (255.0 - c) * tint
            };
            result.clamp(0.0, 255.0) as u8
        };

        (apply(color.0), apply(color.1), apply(color.2))
    }

    // Common colors
    pub const BLACK: Color = Color::Rgb { r: 0, g: 0, b: 0 };
    pub const WHITE: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const RED: Color = Color::Rgb { r: 255, g: 0, b: 0 };
    pub const GREEN: Color = Color::Rgb { r: 0, g: 255, b: 0 };
    pub const BLUE: Color = Color::Rgb { r: 0, g: 0, b: 255 };
    pub const YELLOW: Color = Color::Rgb {
        r: 255,
        g: 255,
        b: 0,
    };
    pub const GRAY: Color = Color::Rgb {
        r: 128,
        g: 128,
        b: 128,
    };
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Auto => write!(f, "auto"),
            Color::Rgb { r, g, b } => write!(f, "#{:02X}{:02X}{:02X}", r, g, b),
            Color::Argb { a, r, g, b } => write!(f, "#{:02X}{:02X}{:02X}{:02X}", a, r, g, b),
            Color::Theme { index, tint } => write!(f, "theme({}, {}%)", index, tint),
            Color::Indexed(i) => write!(f, "indexed({})", i),
        }
    }
}
