use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of rows in a sheet
pub const MAX_ROWS: u32 = 16_384;
/// Maximum number of columns in a sheet
pub const MAX_COLS: u32 = 16_384;

/// Cell coordinate (0-indexed internally)
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub row: u32,
    pub col: u32,
}

impl Position {
    pub const fn new(row: u32, col: u32) -> Self {
        Position { row, col }
    }

    /// Check if this position is within the sheet bounds
    pub fn is_valid(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Create from A1 notation (e.g., "A1" -> (0, 0), "B2" -> (1, 1))
    pub fn from_a1(notation: &str) -> Option<Self> {
        let notation = notation.trim().to_uppercase();
        let mut col_str = String::new();
        let mut row_str = String::new();

        for c in notation.chars() {
            if c.is_ascii_alphabetic() {
                if !row_str.is_empty() {
                    return None; // Letters after numbers
                }
                col_str.push(c);
            } else if c.is_ascii_digit() {
                row_str.push(c);
            } else {
                return None; // Invalid character
            }
        }

        if col_str.is_empty() || row_str.is_empty() {
            return None;
        }

        let col = col_from_label(&col_str)?;
        let row: u32 = row_str.parse().ok()?;

        if row == 0 {
            return None; // Rows are 1-indexed in A1 notation
        }

        Some(Position { row: row - 1, col })
    }

    /// Convert to A1 notation (e.g., (0, 0) -> "A1")
    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_label(self.col), self.row + 1)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
pub fn col_to_label(col: u32) -> String {
    let mut label = String::new();
    let mut n = col + 1; // 1-indexed for calculation

    while n > 0 {
        n -= 1;
        label.insert(0, char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }

    label
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
pub fn col_from_label(label: &str) -> Option<u32> {
    let mut col: u32 = 0;

    for c in label.chars() {
        if !c.is_ascii_alphabetic() {
            return None;
        }
        col = col * 26 + (c.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    if col == 0 {
        None
    } else {
        Some(col - 1) // Convert to 0-indexed
    }
}

/// Extent of the printable region: the smallest rectangle
/// `[0, rows) x [0, cols)` containing every occupied cell.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub rows: u32,
    pub cols: u32,
}

impl Size {
    pub const fn new(rows: u32, cols: u32) -> Self {
        Size { rows, cols }
    }

    /// Grow the rectangle so it covers `pos`
    pub fn cover(&mut self, pos: Position) {
        if pos.row >= self.rows {
            self.rows = pos.row + 1;
        }
        if pos.col >= self.cols {
            self.cols = pos.col + 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_col_to_label() {
        assert_eq!(col_to_label(0), "A");
        assert_eq!(col_to_label(25), "Z");
        assert_eq!(col_to_label(26), "AA");
        assert_eq!(col_to_label(27), "AB");
        assert_eq!(col_to_label(701), "ZZ");
        assert_eq!(col_to_label(702), "AAA");
    }

    #[test]
    fn test_col_from_label() {
        assert_eq!(col_from_label("A"), Some(0));
        assert_eq!(col_from_label("Z"), Some(25));
        assert_eq!(col_from_label("AA"), Some(26));
        assert_eq!(col_from_label("AB"), Some(27));
        assert_eq!(col_from_label("ZZ"), Some(701));
        assert_eq!(col_from_label("7"), None);
    }

    #[test]
    fn test_position_a1() {
        let pos = Position::from_a1("A1").unwrap();
        assert_eq!(pos, Position::new(0, 0));

        let pos = Position::from_a1("Z9").unwrap();
        assert_eq!(pos, Position::new(8, 25));

        let pos = Position::from_a1("AA100").unwrap();
        assert_eq!(pos, Position::new(99, 26));
        assert_eq!(pos.to_a1(), "AA100");

        assert_eq!(Position::from_a1("A0"), None);
        assert_eq!(Position::from_a1("1A"), None);
        assert_eq!(Position::from_a1(""), None);
    }

    #[test]
    fn test_validity() {
        assert!(Position::new(0, 0).is_valid());
        assert!(Position::new(MAX_ROWS - 1, MAX_COLS - 1).is_valid());
        assert!(!Position::new(MAX_ROWS, 0).is_valid());
        assert!(!Position::new(0, MAX_COLS).is_valid());
    }

    #[test]
    fn test_size_cover() {
        let mut size = Size::default();
        assert_eq!(size, Size::new(0, 0));

        size.cover(Position::new(0, 0));
        assert_eq!(size, Size::new(1, 1));

        size.cover(Position::new(5, 2));
        assert_eq!(size, Size::new(6, 3));

        // Covering an interior position does not shrink
        size.cover(Position::new(1, 1));
        assert_eq!(size, Size::new(6, 3));
    }
}
