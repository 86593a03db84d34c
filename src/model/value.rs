//! Typed cell values.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The declared type of a cell, the `t` attribute of `<c>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellType {
    /// `b`
    Boolean,
    /// `d`
    Date,
    /// `e`
    Error,
    /// `inlineStr`
    InlineString,
    /// `n`
    Number,
    /// `s`
    SharedString,
    /// `str`
    String,
    /// Any other tag.
    Unknown(String),
}

impl CellType {
    /// Map an OOXML type tag to a cell type.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "b" => CellType::Boolean,
            "d" => CellType::Date,
            "e" => CellType::Error,
            "inlineStr" => CellType::InlineString,
            "n" => CellType::Number,
            "s" => CellType::SharedString,
            "str" => CellType::String,
            other => CellType::Unknown(other.to_string()),
        }
    }

    /// The OOXML tag for this type.
    pub fn tag(&self) -> &str {
        match self {
            CellType::Boolean => "b",
            CellType::Date => "d",
            CellType::Error => "e",
            CellType::InlineString => "inlineStr",
            CellType::Number => "n",
            CellType::SharedString => "s",
            CellType::String => "str",
            CellType::Unknown(tag) => tag.as_str(),
        }
    }
}

/// Type tag of a decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Empty,
    Boolean,
    Number,
    Text,
    Date,
    Error,
}

/// A decoded cell value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CellValue {
    /// No value, also used to pad skipped columns
    #[default]
    Empty,
    Boolean(bool),
    Number(f64),
    Text(String),
    /// A 1900-epoch serial (or ISO-8601 literal) as a timestamp
    Date(NaiveDateTime),
    /// Error code literal such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// The type tag of this value.
    pub fn kind(&self) -> ValueKind {
        match self {
            CellValue::Empty => ValueKind::Empty,
            CellValue::Boolean(_) => ValueKind::Boolean,
            CellValue::Number(_) => ValueKind::Number,
            CellValue::Text(_) => ValueKind::Text,
            CellValue::Date(_) => ValueKind::Date,
            CellValue::Error(_) => ValueKind::Error,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Boolean(true) => write!(f, "TRUE"),
            CellValue::Boolean(false) => write!(f, "FALSE"),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%dT%H:%M:%S")),
            CellValue::Error(e) => write!(f, "{}", e),
        }
    }
}
