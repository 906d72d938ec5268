//! Number format types

/// Number format attached to a cell style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    /// 14 - mm-dd-yy
    pub const ID_DATE_SHORT: u32 = 14;
    /// 22 - m/d/yy h:mm
    pub const ID_DATETIME: u32 = 22;

    /// Resolve a `numFmtId`, consulting the workbook's custom formats first
    pub fn from_id(id: u32, custom: Option<&str>) -> Self {
        match (id, custom) {
            (0, _) => NumberFormat::General,
            (_, Some(code)) => NumberFormat::Custom(code.to_string()),
            (id, None) => NumberFormat::BuiltIn(id),
        }
    }

    /// Check if this is a date/time format
    ///
    /// Built-in ids 14-22 and 45-47 are date/time formats. Custom codes are
    /// dates when a date or time token remains after bracketed sections
    /// (`[Red]`, `[$-809]`), quoted literals and escaped characters are removed.
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::General => false,
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22 | 45..=47),
            NumberFormat::Custom(code) => {
                let mut stripped = String::with_capacity(code.len());
                let mut chars = code.chars();
                while let Some(c) = chars.next() {
                    match c {
                        '[' => {
                            for c in chars.by_ref() {
                                if c == ']' {
                                    break;
                                }
                            }
                        }
                        '"' => {
                            for c in chars.by_ref() {
                                if c == '"' {
                                    break;
                                }
                            }
                        }
                        '\\' => {
                            chars.next();
                        }
                        c => stripped.push(c.to_ascii_lowercase()),
                    }
                }

                if stripped == "general" {
                    return false;
                }
                stripped
                    .chars()
                    .any(|c| matches!(c, 'y' | 'm' | 'd' | 'h' | 's'))
            }
        }
    }
}
