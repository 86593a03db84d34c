//! Decoded rows.

use super::CellValue;
use crate::reference::{letters_to_index, CellReference};
use serde::{Deserialize, Serialize};

/// A decoded cell with its position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub reference: CellReference,
    pub value: CellValue,
}

/// A decoded, column-aligned row.
///
/// `values` is indexed by zero-based column and is as long as the highest
/// column present in this row. Columns missing from `cells` hold
/// [`CellValue::Empty`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based row number
    pub number: u32,
    /// Decoded cells in ascending column order
    pub cells: Vec<Cell>,
    /// Sparse values, one per column up to the last present column
    pub values: Vec<CellValue>,
}

impl Row {
    /// Value at a 1-based column.
    ///
    /// Columns past the end of the row read as `None`.
    pub fn get(&self, column: u32) -> Option<&CellValue> {
        let index = (column as usize).checked_sub(1)?;
        self.values.get(index)
    }

    /// Value at a column given by letters (e.g., "C").
    pub fn get_by_letters(&self, letters: &str) -> Option<&CellValue> {
        letters_to_index(letters).ok().and_then(|c| self.get(c))
    }

    /// Number of columns in the sparse sequence.
    pub fn width(&self) -> usize {
        self.values.len()
    }

    /// Highest column present in this row.
    pub fn max_column(&self) -> u32 {
        self.cells.last().map(|c| c.reference.column).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Row {
        Row {
            number: 4,
            cells: vec![Cell {
                reference: CellReference::parse("B4").unwrap(),
                value: CellValue::Number(2.0),
            }],
            values: vec![CellValue::Empty, CellValue::Number(2.0)],
        }
    }

    #[test]
    fn test_get() {
        let row = sample();
        assert_eq!(row.get(1), Some(&CellValue::Empty));
        assert_eq!(row.get(2), Some(&CellValue::Number(2.0)));
        assert_eq!(row.get(3), None);
        assert_eq!(row.get(0), None);
        assert_eq!(row.get_by_letters("b"), Some(&CellValue::Number(2.0)));
        assert_eq!(row.get_by_letters("1"), None);
    }

    #[test]
    fn test_width() {
        let row = sample();
        assert_eq!(row.width(), 2);
        assert_eq!(row.max_column(), 2);
    }
}
