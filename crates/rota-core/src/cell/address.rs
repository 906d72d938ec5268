//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1", "C12")
///
/// Rows and columns are 0-based internally; the A1 form is 1-based for rows.
/// `$` markers are accepted when parsing and dropped, since imports only ever
/// need to point back at a cell, never to copy a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ..., XFD=16383)
    pub col: u16,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Parse a cell address from A1-style notation
    ///
    /// # Examples
    /// ```
    /// use rota_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!(addr.row, 1);
    /// assert_eq!(addr.col, 1);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        // Parse column letters
        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }

        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }

        let col = Self::letters_to_column(&s[col_start..pos])?;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        // Parse row number
        let row_str = &s[pos..];
        if row_str.is_empty() {
            return Err(Error::InvalidAddress(format!("no row number in '{}'", s)));
        }

        let row: u32 = row_str
            .parse()
            .map_err(|_| Error::InvalidAddress(format!("invalid row number in '{}'", s)))?;

        // Excel rows are 1-based, we use 0-based internally
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }

        let row = row - 1;

        if row >= MAX_ROWS {
            return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
        }

        Ok(Self { row, col })
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1; // 1-based for calculation

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    /// Convert column letters to index (A = 0, Z = 25, AA = 26, etc.)
    pub fn letters_to_column(letters: &str) -> Result<u16> {
        if letters.is_empty() {
            return Err(Error::InvalidAddress("empty column letters".into()));
        }

        let mut col: u32 = 0;
        for c in letters.chars() {
            if !c.is_ascii_alphabetic() {
                return Err(Error::InvalidAddress(format!(
                    "invalid column letter '{}'",
                    c
                )));
            }
            col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
            if col > MAX_COLS as u32 {
                return Err(Error::ColumnOutOfBounds(u16::MAX, MAX_COLS - 1));
            }
        }

        Ok((col - 1) as u16)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A rectangular range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range, normalised so `start` is top-left
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        Self {
            start: CellAddress::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellAddress::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Create a range from row/column indices
    pub fn from_indices(start_row: u32, start_col: u16, end_row: u32, end_col: u16) -> Self {
        Self::new(
            CellAddress::new(start_row, start_col),
            CellAddress::new(end_row, end_col),
        )
    }

    /// Parse a range from A1:B10 notation
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();

        match s.split_once(':') {
            Some((start, end)) => Ok(Self::new(
                CellAddress::parse(start)?,
                CellAddress::parse(end)?,
            )),
            None => {
                let addr = CellAddress::parse(s)?;
                Ok(Self::new(addr, addr))
            }
        }
    }

    /// Check if a cell is within this range
    pub fn contains(&self, addr: &CellAddress) -> bool {
        addr.row >= self.start.row
            && addr.row <= self.end.row
            && addr.col >= self.start.col
            && addr.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Format as A1:B10 string
    pub fn to_a1_string(&self) -> String {
        if self.start == self.end {
            self.start.to_a1_string()
        } else {
            format!("{}:{}", self.start.to_a1_string(), self.end.to_a1_string())
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
