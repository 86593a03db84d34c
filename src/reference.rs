//! Column letter codec and A1-style cell references.
//!
//! Columns are 1-based throughout: `A` is 1, `Z` is 26, `AA` is 27.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Highest column a worksheet can hold (`XFD`).
pub const MAX_COLUMN: u32 = 16_384;

/// Convert column letters to a 1-based column number.
///
/// Letters are case-insensitive.
///
/// # Example
///
/// ```
/// use unsheet::reference::letters_to_index;
///
/// assert_eq!(letters_to_index("A")?, 1);
/// assert_eq!(letters_to_index("az")?, 52);
/// # Ok::<(), unsheet::Error>(())
/// ```
pub fn letters_to_index(letters: &str) -> Result<u32> {
    if letters.is_empty() {
        return Err(Error::InvalidColumnReference(letters.to_string()));
    }

    let mut acc: u32 = 0;
    for c in letters.chars() {
        if !c.is_ascii_alphabetic() {
            return Err(Error::InvalidColumnReference(letters.to_string()));
        }
        let digit = (c.to_ascii_uppercase() as u32) - ('A' as u32) + 1;
        acc = acc
            .checked_mul(26)
            .and_then(|v| v.checked_add(digit))
            .ok_or_else(|| Error::InvalidColumnReference(letters.to_string()))?;
    }

    Ok(acc)
}

/// Convert a 1-based column number to uppercase letters.
pub fn index_to_letters(index: u32) -> Result<String> {
    if index == 0 {
        return Err(Error::InvalidColumnReference("0".to_string()));
    }

    let mut letters = Vec::new();
    let mut n = index;
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();

    Ok(letters.into_iter().map(char::from).collect())
}

/// The two halves of an A1-style reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceParts<'a> {
    /// Leading column letters
    pub letters: &'a str,
    /// Trailing row digits
    pub digits: &'a str,
}

/// Split `"AA17"` into `"AA"` and `"17"`.
///
/// Only ASCII letters and digits are accepted, and every letter must precede
/// every digit.
pub fn split_reference(reference: &str) -> Result<ReferenceParts<'_>> {
    let malformed = || Error::MalformedCellReference(reference.to_string());

    let split = reference
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(reference.len());
    let (letters, digits) = reference.split_at(split);

    if letters.is_empty() || digits.is_empty() {
        return Err(malformed());
    }
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    Ok(ReferenceParts { letters, digits })
}

/// A parsed cell reference such as `C4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellReference {
    /// 1-based row number
    pub row: u32,
    /// 1-based column number
    pub column: u32,
    /// Uppercase column letters
    pub letters: String,
}

impl CellReference {
    /// Parse an A1-style reference.
    ///
    /// # Example
    ///
    /// ```
    /// use unsheet::CellReference;
    ///
    /// let r = CellReference::parse("B12")?;
    /// assert_eq!((r.row, r.column), (12, 2));
    /// # Ok::<(), unsheet::Error>(())
    /// ```
    pub fn parse(reference: &str) -> Result<Self> {
        let parts = split_reference(reference)?;
        let column = letters_to_index(parts.letters)?;
        if column > MAX_COLUMN {
            return Err(Error::InvalidColumnReference(parts.letters.to_string()));
        }
        let row: u32 = parts
            .digits
            .parse()
            .map_err(|_| Error::MalformedCellReference(reference.to_string()))?;
        if row == 0 {
            return Err(Error::MalformedCellReference(reference.to_string()));
        }

        Ok(Self {
            row,
            column,
            letters: parts.letters.to_ascii_uppercase(),
        })
    }

    /// Build a reference from 1-based coordinates.
    pub fn from_coordinates(row: u32, column: u32) -> Result<Self> {
        if row == 0 {
            return Err(Error::MalformedCellReference(format!("row {}", row)));
        }
        if column > MAX_COLUMN {
            return Err(Error::InvalidColumnReference(column.to_string()));
        }
        Ok(Self {
            row,
            column,
            letters: index_to_letters(column)?,
        })
    }

    /// Zero-based column, the position inside [`crate::Row::values`].
    pub fn column_zero_based(&self) -> usize {
        self.column as usize - 1
    }
}

impl FromStr for CellReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.letters, self.row)
    }
}

/// Worksheet dimension hint, the `ref` of `<dimension>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    pub start: CellReference,
    pub end: CellReference,
}

impl Dimension {
    /// Parse `"A1:C10"` or a single-cell `"B2"`.
    pub fn parse(hint: &str) -> Result<Self> {
        let hint = hint.trim();
        let (first, second) = match hint.split_once(':') {
            Some((a, b)) => (a, b),
            None => (hint, hint),
        };

        let a = CellReference::parse(first)?;
        let b = CellReference::parse(second)?;

        Ok(Self {
            start: CellReference::from_coordinates(a.row.min(b.row), a.column.min(b.column))?,
            end: CellReference::from_coordinates(a.row.max(b.row), a.column.max(b.column))?,
        })
    }

    /// Number of rows the hint covers.
    pub fn row_span(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Number of columns the hint covers.
    pub fn column_span(&self) -> u32 {
        self.end.column - self.start.column + 1
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_letters_to_index() {
        assert_eq!(letters_to_index("A").unwrap(), 1);
        assert_eq!(letters_to_index("Z").unwrap(), 26);
        assert_eq!(letters_to_index("AA").unwrap(), 27);
        assert_eq!(letters_to_index("AZ").unwrap(), 52);
        assert_eq!(letters_to_index("xfd").unwrap(), 16_384);
    }

    #[test]
    fn test_letters_to_index_rejects_bad_input() {
        assert!(matches!(
            letters_to_index(""),
            Err(Error::InvalidColumnReference(_))
        ));
        assert!(matches!(
            letters_to_index("A1"),
            Err(Error::InvalidColumnReference(_))
        ));
        assert!(matches!(
            letters_to_index("Ä"),
            Err(Error::InvalidColumnReference(_))
        ));
        assert!(letters_to_index("ZZZZZZZZZZ").is_err());
    }

    #[test]
    fn test_column_round_trip() {
        for letters in ["A", "b", "Z", "aa", "AZ", "BA", "ZZ", "AAA", "XFD"] {
            let index = letters_to_index(letters).unwrap();
            assert_eq!(index_to_letters(index).unwrap(), letters.to_ascii_uppercase());
        }
        for index in 1..=2000 {
            let letters = index_to_letters(index).unwrap();
            assert_eq!(letters_to_index(&letters).unwrap(), index);
        }
        assert!(index_to_letters(0).is_err());
    }

    #[test]
    fn test_split_reference() {
        let parts = split_reference("B12").unwrap();
        assert_eq!(parts.letters, "B");
        assert_eq!(parts.digits, "12");

        let parts = split_reference("aa17").unwrap();
        assert_eq!(parts.letters, "aa");
        assert_eq!(parts.digits, "17");
    }

    #[test]
    fn test_split_reference_malformed() {
        for bad in ["", "B", "12", "1B", "B1C", "$B$1", "B 1", "B-1"] {
            assert!(
                matches!(split_reference(bad), Err(Error::MalformedCellReference(_))),
                "{bad:?} should be malformed"
            );
        }
    }

    #[test]
    fn test_parse_reference() {
        let r = CellReference::parse("B12").unwrap();
        assert_eq!(r.row, 12);
        assert_eq!(r.column, 2);
        assert_eq!(r.letters, "B");
        assert_eq!(r.to_string(), "B12");

        let r: CellReference = "ab3".parse().unwrap();
        assert_eq!(r.column, 28);
        assert_eq!(r.to_string(), "AB3");

        assert!(CellReference::parse("A0").is_err());
        assert!(CellReference::parse("A99999999999").is_err());
    }

    #[test]
    fn test_parse_reference_column_limit() {
        assert_eq!(CellReference::parse("XFD1").unwrap().column, MAX_COLUMN);
        for bad in ["XFE1", "ZZZZZZ1"] {
            assert!(matches!(
                CellReference::parse(bad),
                Err(Error::InvalidColumnReference(_))
            ));
        }
        assert!(CellReference::from_coordinates(1, MAX_COLUMN + 1).is_err());
        assert!(Dimension::parse("A1:XFE10").is_err());
    }

    #[test]
    fn test_dimension() {
        let dim = Dimension::parse("A1:C10").unwrap();
        assert_eq!(dim.row_span(), 10);
        assert_eq!(dim.column_span(), 3);
        assert_eq!(dim.to_string(), "A1:C10");

        let single = Dimension::parse("B2").unwrap();
        assert_eq!(single.row_span(), 1);

        let reversed = Dimension::parse("C10:A1").unwrap();
        assert_eq!(reversed.start.to_string(), "A1");

        assert!(Dimension::parse("").is_err());
        assert!(Dimension::parse("A1:").is_err());
    }
}
