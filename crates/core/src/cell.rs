//! Cell and row identity.
//!
//! A `CellRef` addresses one row/column intersection of the rendered grid.
//! A `RowId` is the persistent identifier the backend knows the row by.

use serde::{Deserialize, Serialize};

/// Position of a cell in the rendered grid body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellRef {
    /// Body row index (0-based, as rendered)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
}

impl CellRef {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// True if both cells sit in the same column.
    #[inline]
    pub fn same_column(&self, other: &CellRef) -> bool {
        self.col == other.col
    }
}

impl std::fmt::Display for CellRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", col_to_letters(self.col), self.row + 1)
    }
}

/// Convert 0-based column index to letter(s): 0=A, 25=Z, 26=AA.
fn col_to_letters(col: usize) -> String {
    let mut result = String::new();
    let mut n = col;
    loop {
        result.insert(0, (b'A' + (n % 26) as u8) as char);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    result
}

/// Backend identifier of a row, taken from the row's `data-id` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RowId(pub i64);

impl RowId {
    /// Parse a row attribute the lenient way browsers do for integers:
    /// leading whitespace, optional sign, then as many digits as present.
    /// Trailing garbage is ignored ("42px" is 42). No digits at all is `None`.
    pub fn parse_attr(raw: &str) -> Option<RowId> {
        let s = raw.trim_start();
        let (negative, rest) = match s.as_bytes().first() {
            Some(b'-') => (true, &s[1..]),
            Some(b'+') => (false, &s[1..]),
            _ => (false, s),
        };

        let digits: &str = {
            let end = rest
                .char_indices()
                .find(|(_, c)| !c.is_ascii_digit())
                .map(|(i, _)| i)
                .unwrap_or(rest.len());
            &rest[..end]
        };
        if digits.is_empty() {
            return None;
        }

        let magnitude: i64 = digits.parse().ok()?;
        Some(RowId(if negative { -magnitude } else { magnitude }))
    }

    #[inline]
    pub fn raw(&self) -> i64 {
        self.0
    }
}

impl From<i64> for RowId {
    fn from(value: i64) -> Self {
        RowId(value)
    }
}

impl std::fmt::Display for RowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
