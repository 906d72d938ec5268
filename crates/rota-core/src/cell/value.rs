//! Cell value types

use std::fmt;
use std::sync::Arc;

use chrono::{NaiveDateTime, NaiveTime};

/// Represents the value stored in a cell
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Empty cell (no value)
    #[default]
    Empty,

    /// Boolean value (TRUE/FALSE)
    Boolean(bool),

    /// Numeric value
    Number(f64),

    /// String value
    String(SharedString),

    /// Date/time value.
    ///
    /// Produced by readers for numeric cells carrying a date number format.
    DateTime(NaiveDateTime),

    /// Error value (#VALUE!, #REF!, etc.)
    Error(CellError),

    /// Formula with cached result
    Formula {
        /// Original formula text (e.g., "=TODAY()")
        text: String,
        /// Last calculated value stored in the file (if any)
        cached_value: Option<Box<CellValue>>,
    },
}

impl CellValue {
    /// Create a new string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        CellValue::String(SharedString::new(s.into()))
    }

    /// Create a new formula value with a cached result
    pub fn formula<S: Into<String>>(text: S, cached_value: Option<CellValue>) -> Self {
        CellValue::Formula {
            text: text.into(),
            cached_value: cached_value.map(Box::new),
        }
    }

    /// Check if the cell is empty
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Check if the cell contains a formula
    pub fn is_formula(&self) -> bool {
        matches!(self, CellValue::Formula { .. })
    }

    /// Try to get the value as a number
    pub fn as_number(&self) -> Option<f64> {
        match self.effective_value() {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the value as a date/time
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self.effective_value() {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Try to get the value as a string
    pub fn as_string(&self) -> Option<&str> {
        match self.effective_value() {
            CellValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Get the effective value (cached value for formulas, value otherwise)
    pub fn effective_value(&self) -> &CellValue {
        match self {
            CellValue::Formula {
                cached_value: Some(v),
                ..
            } => v.effective_value(),
            _ => self,
        }
    }

    /// The text a user would see in the cell.
    ///
    /// Whole numbers print without a fractional part, dates print as
    /// `YYYY-MM-DD` (with a time suffix only when one is present) and formulas
    /// print their cached result, or nothing when the file carried none.
    pub fn display_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Boolean(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            CellValue::String(s) => s.to_string(),
            CellValue::DateTime(dt) => {
                if dt.time() == NaiveTime::MIN {
                    dt.format("%Y-%m-%d").to_string()
                } else {
                    dt.format("%Y-%m-%d %H:%M:%S").to_string()
                }
            }
            CellValue::Error(e) => e.to_string(),
            CellValue::Formula {
                cached_value: Some(v),
                ..
            } => v.display_text(),
            CellValue::Formula { .. } => String::new(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_text())
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::string(s)
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::string(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<CellError> for CellValue {
    fn from(e: CellError) -> Self {
        CellValue::Error(e)
    }
}

/// Excel error values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellError {
    /// #NULL! - Incorrect range operator
    Null,
    /// #DIV/0! - Division by zero
    Div0,
    /// #VALUE! - Wrong type of argument or operand
    Value,
    /// #REF! - Invalid cell reference
    Ref,
    /// #NAME? - Unrecognized formula name
    Name,
    /// #NUM! - Invalid numeric value
    Num,
    /// #N/A - Value not available
    Na,
}

impl CellError {
    /// Get the display string for this error
    pub fn as_str(&self) -> &'static str {
        match self {
            CellError::Null => "#NULL!",
            CellError::Div0 => "#DIV/0!",
            CellError::Value => "#VALUE!",
            CellError::Ref => "#REF!",
            CellError::Name => "#NAME?",
            CellError::Num => "#NUM!",
            CellError::Na => "#N/A",
        }
    }

    /// Parse an error string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "#NULL!" => Some(CellError::Null),
            "#DIV/0!" => Some(CellError::Div0),
            "#VALUE!" => Some(CellError::Value),
            "#REF!" => Some(CellError::Ref),
            "#NAME?" => Some(CellError::Name),
            "#NUM!" => Some(CellError::Num),
            "#N/A" => Some(CellError::Na),
            _ => None,
        }
    }
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shared, immutable string
///
/// Shared-string tables repeat the same names and labels across many cells;
/// `Arc<str>` lets every cell point at one copy.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SharedString(Arc<str>);

impl SharedString {
    /// Create a new shared string
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        SharedString(Arc::from(s.as_ref()))
    }

    /// Get the string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the length of the string in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the string is empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for SharedString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for SharedString {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SharedString {
    fn from(s: &str) -> Self {
        SharedString::new(s)
    }
}

impl From<String> for SharedString {
    fn from(s: String) -> Self {
        SharedString::new(s)
    }
}
