//! Error types for the unsheet library.

use std::io;
use thiserror::Error;

/// Result type alias for unsheet operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while decoding a workbook.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file is not a spreadsheet package.
    #[error("Unknown file format")]
    UnknownFormat,

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// A required package part is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Column letters are empty or contain a non-letter.
    #[error("Invalid column reference: {0:?}")]
    InvalidColumnReference(String),

    /// A cell reference is not `<letters><digits>`.
    #[error("Malformed cell reference: {0:?}")]
    MalformedCellReference(String),

    /// The cell declares a type tag this decoder does not know.
    #[error("Unrecognized cell type {tag:?} at {reference}")]
    UnrecognizedCellType { reference: String, tag: String },

    /// A shared-string index points past the end of the table.
    #[error("Shared string index {index} out of range at {reference} (table has {len})")]
    SharedStringIndexOutOfRange {
        reference: String,
        index: usize,
        len: usize,
    },

    /// A shared-string cell whose value is not an integer index.
    #[error("Invalid shared string index {value:?} at {reference}")]
    InvalidSharedStringIndex { reference: String, value: String },

    /// A numeric cell whose literal does not parse.
    #[error("Invalid number {value:?} at {reference}")]
    InvalidNumber { reference: String, value: String },

    /// A boolean cell whose literal is neither "0" nor "1".
    #[error("Invalid boolean {value:?} at {reference}")]
    InvalidBoolean { reference: String, value: String },

    /// A date cell whose literal is neither a serial nor an ISO-8601 timestamp.
    #[error("Invalid date {value:?} at {reference}")]
    InvalidDate { reference: String, value: String },

    /// Cells of a row are not in strictly ascending column order.
    #[error("Out of order cells in row {row}: column {column} follows column {previous}")]
    OutOfOrderCells { row: u32, previous: u32, column: u32 },

    /// A row failed to decode.
    #[error("Row {row} of sheet {sheet:?}: {source}")]
    Row {
        sheet: String,
        row: u32,
        #[source]
        source: Box<Error>,
    },

    /// A worksheet could not be read or parsed.
    #[error("Worksheet {sheet:?}: {source}")]
    Worksheet {
        sheet: String,
        #[source]
        source: Box<Error>,
    },

    /// The worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// A background task panicked or was aborted.
    #[error("Task join error: {0}")]
    Join(String),
}

impl Error {
    /// Whether this error aborts the whole decode.
    ///
    /// Everything else is scoped to a single cell, row or worksheet.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::UnknownFormat
                | Error::ZipArchive(_)
                | Error::MissingComponent(_)
                | Error::ThreadPool(_)
                | Error::Join(_)
        )
    }

    pub(crate) fn in_row(self, sheet: &str, row: u32) -> Self {
        Error::Row {
            sheet: sheet.to_string(),
            row,
            source: Box::new(self),
        }
    }

    pub(crate) fn in_worksheet(self, sheet: &str) -> Self {
        Error::Worksheet {
            sheet: sheet.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<rayon::ThreadPoolBuildError> for Error {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        Error::ThreadPool(err.to_string())
    }
}
