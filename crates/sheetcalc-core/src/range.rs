use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of addressable columns. A column name is a single letter `A`..=`Z`.
pub const MAX_COLS: u32 = 26;

/// Cell coordinate (0-indexed internally)
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    pub const fn new(row: u32, col: u32) -> Self {
        CellCoord { row, col }
    }

    /// Create from a cell name (e.g., "A1" -> (0, 0), "B2" -> (1, 1))
    pub fn from_name(name: &str) -> Option<Self> {
        parse_name(name)
    }

    /// Convert to a cell name, `None` when the column has no letter
    pub fn to_name(&self) -> Option<String> {
        format_name(self.row, self.col)
    }

    /// Check if this coord is within bounds
    pub fn is_valid(&self, max_rows: u32, max_cols: u32) -> bool {
        self.row < max_rows && self.col < max_cols
    }

    /// Offset by a signed delta, `None` when either axis leaves `[0, rows) x [0, cols)`
    pub fn offset(&self, d_row: i64, d_col: i64, rows: u32, cols: u32) -> Option<Self> {
        let row = i64::from(self.row) + d_row;
        let col = i64::from(self.col) + d_col;
        if row < 0 || col < 0 || row >= i64::from(rows) || col >= i64::from(cols) {
            return None;
        }
        Some(CellCoord::new(row as u32, col as u32))
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_name() {
            Some(name) => f.write_str(&name),
            None => write!(f, "R{}C{}", self.row + 1, self.col + 1),
        }
    }
}

/// Format a (row, col) pair as a cell name (e.g., (2, 1) -> "B3").
///
/// Returns `None` when `col` is past `Z`.
pub fn format_name(row: u32, col: u32) -> Option<String> {
    if col >= MAX_COLS {
        return None;
    }
    let letter = char::from(b'A' + col as u8);
    Some(format!("{}{}", letter, u64::from(row) + 1))
}

/// Parse a cell name into a coordinate.
///
/// The first character is the column letter (`A`..=`Z`), the rest must be a
/// non-empty run of digits forming a 1-based row number.
pub fn parse_name(name: &str) -> Option<CellCoord> {
    let mut chars = name.chars();
    let letter = chars.next()?;
    if !letter.is_ascii_uppercase() {
        return None;
    }

    let digits = chars.as_str();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let row: u32 = digits.parse().ok()?;
    if row == 0 {
        return None; // Rows are 1-indexed in cell names
    }

    Some(CellCoord {
        row: row - 1,
        col: letter as u32 - 'A' as u32,
    })
}

/// Split a range string on `:` into its two endpoint names.
///
/// A string without `:` denotes a single-cell range `(name, name)`.
pub fn parse_range(range: &str) -> (&str, &str) {
    match range.split_once(':') {
        Some((start, end)) => (start.trim(), end.trim()),
        None => {
            let name = range.trim();
            (name, name)
        }
    }
}

/// A rectangular range of cells (e.g., A1:B10)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRange {
    pub start: CellCoord,
    pub end: CellCoord,
}

impl CellRange {
    pub fn new(start: CellCoord, end: CellCoord) -> Self {
        // Normalize so start is top-left and end is bottom-right
        CellRange {
            start: CellCoord::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellCoord::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Parse "A1:B3" or a single name "A1"
    pub fn parse(range: &str) -> Option<Self> {
        let (start, end) = parse_range(range);
        Some(CellRange::new(parse_name(start)?, parse_name(end)?))
    }

    /// Smallest range covering both this range and `coord`
    pub fn including(&self, coord: CellCoord) -> Self {
        CellRange {
            start: CellCoord::new(self.start.row.min(coord.row), self.start.col.min(coord.col)),
            end: CellCoord::new(self.end.row.max(coord.row), self.end.col.max(coord.col)),
        }
    }

    /// Check if a coordinate is within this range
    pub fn contains(&self, coord: CellCoord) -> bool {
        coord.row >= self.start.row
            && coord.row <= self.end.row
            && coord.col >= self.start.col
            && coord.col <= self.end.col
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u32 {
        self.end.col - self.start.col + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        u64::from(self.row_count()) * u64::from(self.col_count())
    }

    /// Check if this range is a single cell
    pub fn is_single_cell(&self) -> bool {
        self.start == self.end
    }

    /// Iterate over all coordinates in the range (row by row)
    pub fn iter(&self) -> CellRangeIter {
        CellRangeIter {
            range: *self,
            current_row: self.start.row,
            current_col: self.start.col,
            done: false,
        }
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_single_cell() {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

impl IntoIterator for CellRange {
    type Item = CellCoord;
    type IntoIter = CellRangeIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over coordinates in a range
pub struct CellRangeIter {
    range: CellRange,
    current_row: u32,
    current_col: u32,
    done: bool,
}

impl Iterator for CellRangeIter {
    type Item = CellCoord;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let coord = CellCoord::new(self.current_row, self.current_col);

        if self.current_col < self.range.end.col {
            self.current_col += 1;
        } else if self.current_row < self.range.end.row {
            self.current_col = self.range.start.col;
            self.current_row += 1;
        } else {
            self.done = true;
        }

        Some(coord)
    }
}
