//! Cell type decoding.

use super::options::ErrorMode;
use crate::error::{Error, Result};
use crate::model::{Cell, CellElement, CellType, CellValue};
use crate::reference::CellReference;
use crate::xlsx::SharedStrings;
use chrono::{Duration, NaiveDate, NaiveDateTime};

/// Serial date range accepted by spreadsheet applications
/// (0100-01-01 to 9999-12-31 23:59:59.999).
const MIN_SERIAL_DATE: f64 = -657_435.0;
const MAX_SERIAL_DATE: f64 = 2_958_466.0;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Turns raw cell elements into typed cells.
#[derive(Debug, Clone, Copy)]
pub struct CellDecoder<'a> {
    shared_strings: &'a SharedStrings,
    mode: ErrorMode,
}

impl<'a> CellDecoder<'a> {
    pub fn new(shared_strings: &'a SharedStrings, mode: ErrorMode) -> Self {
        Self {
            shared_strings,
            mode,
        }
    }

    /// Decode one cell: parse its reference, then type its value.
    pub fn decode(&self, element: &CellElement) -> Result<Cell> {
        let reference = CellReference::parse(&element.reference)?;
        let value = self.decode_value(
            &element.reference,
            element.declared_type.as_deref(),
            element.raw_value.as_deref(),
        )?;
        Ok(Cell { reference, value })
    }

    /// Type a raw value according to its declared tag.
    ///
    /// A missing value always yields `Empty`, whatever the tag. An untyped
    /// literal is kept as text.
    pub fn decode_value(
        &self,
        reference: &str,
        declared_type: Option<&str>,
        raw: Option<&str>,
    ) -> Result<CellValue> {
        let (tag, raw) = match (declared_type, raw) {
            (None, None) => return Ok(CellValue::Empty),
            (None, Some(raw)) => return Ok(CellValue::Text(raw.to_string())),
            (Some(_), None) => return Ok(CellValue::Empty),
            (Some(tag), Some(raw)) => (tag, raw),
        };

        match CellType::from_tag(tag) {
            CellType::Date => parse_date(raw)
                .map(CellValue::Date)
                .ok_or_else(|| Error::InvalidDate {
                    reference: reference.to_string(),
                    value: raw.to_string(),
                }),
            CellType::SharedString => self.shared_string(reference, raw),
            CellType::String | CellType::InlineString => Ok(CellValue::Text(raw.to_string())),
            CellType::Boolean => match raw.trim() {
                "1" => Ok(CellValue::Boolean(true)),
                "0" => Ok(CellValue::Boolean(false)),
                _ => Err(Error::InvalidBoolean {
                    reference: reference.to_string(),
                    value: raw.to_string(),
                }),
            },
            CellType::Number => raw
                .trim()
                .parse::<f64>()
                .map(CellValue::Number)
                .map_err(|_| Error::InvalidNumber {
                    reference: reference.to_string(),
                    value: raw.to_string(),
                }),
            CellType::Error => Ok(CellValue::Error(raw.to_string())),
            CellType::Unknown(tag) => match self.mode {
                ErrorMode::Lenient => {
                    log::warn!("unrecognized cell type {:?} at {}, decoded as empty", tag, reference);
                    Ok(CellValue::Empty)
                }
                ErrorMode::Strict => Err(Error::UnrecognizedCellType {
                    reference: reference.to_string(),
                    tag,
                }),
            },
        }
    }

    fn shared_string(&self, reference: &str, raw: &str) -> Result<CellValue> {
        let index: usize = raw
            .trim()
            .parse()
            .map_err(|_| Error::InvalidSharedStringIndex {
                reference: reference.to_string(),
                value: raw.to_string(),
            })?;

        self.shared_strings
            .get(index)
            .map(|s| CellValue::Text(s.to_string()))
            .ok_or_else(|| Error::SharedStringIndexOutOfRange {
                reference: reference.to_string(),
                index,
                len: self.shared_strings.len(),
            })
    }
}

/// Interpret a date literal.
///
/// Numbers are 1900-epoch serials counted from 1899-12-30 with the time of
/// day in the fraction. Anything else is tried as an ISO-8601 timestamp.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(serial) => serial_to_datetime(serial),
        Err(_) => parse_iso_datetime(raw),
    }
}

/// Convert a 1900-epoch serial to a timestamp, to the millisecond.
///
/// Negative serials count days backwards while the fraction still moves
/// forward within the day, so -1.25 is 1899-12-29 06:00.
pub fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(MIN_SERIAL_DATE..MAX_SERIAL_DATE).contains(&serial) {
        return None;
    }

    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let days = serial.trunc() as i64;
    let millis = (serial.fract().abs() * MILLIS_PER_DAY).round() as i64;

    epoch
        .checked_add_signed(Duration::days(days))?
        .checked_add_signed(Duration::milliseconds(millis))
}

fn parse_iso_datetime(raw: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

    let trimmed = raw.trim_end_matches('Z');
    FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(trimmed, f).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ValueKind;

    fn table() -> SharedStrings {
        ["a", "b", "c"].into_iter().collect()
    }

    fn decode(tag: Option<&str>, raw: Option<&str>) -> Result<CellValue> {
        let strings = table();
        CellDecoder::new(&strings, ErrorMode::Lenient).decode_value("A1", tag, raw)
    }

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn test_absent_type_and_value() {
        assert_eq!(decode(None, None).unwrap(), CellValue::Empty);
        assert_eq!(
            decode(None, Some("42")).unwrap(),
            CellValue::Text("42".to_string())
        );
        for tag in ["s", "b", "n", "d", "e", "str", "zz"] {
            assert_eq!(decode(Some(tag), None).unwrap(), CellValue::Empty);
        }
    }

    #[test]
    fn test_shared_string() {
        assert_eq!(
            decode(Some("s"), Some("2")).unwrap(),
            CellValue::Text("c".to_string())
        );
        assert!(matches!(
            decode(Some("s"), Some("3")),
            Err(Error::SharedStringIndexOutOfRange { index: 3, len: 3, .. })
        ));
        assert!(matches!(
            decode(Some("s"), Some("-1")),
            Err(Error::InvalidSharedStringIndex { .. })
        ));
    }

    #[test]
    fn test_boolean() {
        assert_eq!(decode(Some("b"), Some("1")).unwrap(), CellValue::Boolean(true));
        assert_eq!(decode(Some("b"), Some("0")).unwrap(), CellValue::Boolean(false));
        assert!(matches!(
            decode(Some("b"), Some("7")),
            Err(Error::InvalidBoolean { .. })
        ));
        assert!(decode(Some("b"), Some("true")).is_err());
    }

    #[test]
    fn test_number() {
        assert_eq!(decode(Some("n"), Some("3.25")).unwrap(), CellValue::Number(3.25));
        assert_eq!(decode(Some("n"), Some("1E3")).unwrap(), CellValue::Number(1000.0));
        assert!(matches!(
            decode(Some("n"), Some("abc")),
            Err(Error::InvalidNumber { .. })
        ));
        assert!(decode(Some("n"), Some("")).is_err());
    }

    #[test]
    fn test_strings_and_errors() {
        assert_eq!(
            decode(Some("str"), Some(" x ")).unwrap(),
            CellValue::Text(" x ".to_string())
        );
        assert_eq!(
            decode(Some("inlineStr"), Some("y")).unwrap(),
            CellValue::Text("y".to_string())
        );
        let err = decode(Some("e"), Some("#DIV/0!")).unwrap();
        assert_eq!(err, CellValue::Error("#DIV/0!".to_string()));
        assert_eq!(err.kind(), ValueKind::Error);
    }

    #[test]
    fn test_unknown_type() {
        assert_eq!(decode(Some("zz"), Some("1")).unwrap(), CellValue::Empty);

        let strings = table();
        let strict = CellDecoder::new(&strings, ErrorMode::Strict);
        assert!(matches!(
            strict.decode_value("B2", Some("zz"), Some("1")),
            Err(Error::UnrecognizedCellType { ref tag, .. }) if tag == "zz"
        ));
    }

    #[test]
    fn test_date_serial() {
        assert_eq!(
            decode(Some("d"), Some("45000.5")).unwrap(),
            CellValue::Date(datetime(2023, 3, 15, 12, 0, 0))
        );
        assert_eq!(serial_to_datetime(1.0), Some(datetime(1899, 12, 31, 0, 0, 0)));
        assert_eq!(serial_to_datetime(-1.25), Some(datetime(1899, 12, 29, 6, 0, 0)));
        assert_eq!(serial_to_datetime(f64::NAN), None);
        assert_eq!(serial_to_datetime(3_000_000.0), None);
    }

    #[test]
    fn test_date_iso() {
        assert_eq!(
            decode(Some("d"), Some("2024-02-29T08:15:00Z")).unwrap(),
            CellValue::Date(datetime(2024, 2, 29, 8, 15, 0))
        );
        assert_eq!(
            decode(Some("d"), Some("2024-02-29")).unwrap(),
            CellValue::Date(datetime(2024, 2, 29, 0, 0, 0))
        );
        assert!(matches!(
            decode(Some("d"), Some("soon")),
            Err(Error::InvalidDate { .. })
        ));
    }

    #[test]
    fn test_decode_element() {
        let strings = table();
        let decoder = CellDecoder::new(&strings, ErrorMode::Lenient);

        let cell = decoder
            .decode(&CellElement::new("AA17").with_type("s").with_value("1"))
            .unwrap();
        assert_eq!(cell.reference.row, 17);
        assert_eq!(cell.reference.column, 27);
        assert_eq!(cell.value, CellValue::Text("b".to_string()));

        assert!(matches!(
            decoder.decode(&CellElement::new("17").with_value("x")),
            Err(Error::MalformedCellReference(_))
        ));
    }
}
