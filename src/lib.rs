//! # unsheet
//!
//! Concurrent streaming decoder for XLSX worksheet cells.
//!
//! A workbook is opened, its shared strings are loaded, and every worksheet
//! is then decoded in parallel. Worksheets and their rows are delivered
//! through bounded blocking streams as soon as they are ready, so memory
//! stays flat however large the sheet.
//!
//! ## Quick Start
//!
//! ```no_run
//! let workbook = unsheet::decode_workbook("data.xlsx")?;
//! for worksheet in workbook {
//!     let worksheet = worksheet?;
//!     for row in worksheet.rows() {
//!         let row = row?;
//!         println!("{} row {}: {:?}", worksheet.name(), row.number, row.values);
//!     }
//! }
//! # Ok::<(), unsheet::Error>(())
//! ```
//!
//! Rows arrive in completion order. Use [`Worksheet::collect_sorted`] when
//! document order matters and the sheet fits in memory.
//!
//! ## Options
//!
//! ```no_run
//! use unsheet::{decode_workbook_with_options, DecodeOptions};
//!
//! let options = DecodeOptions::new().strict().with_threads(4);
//! let workbook = decode_workbook_with_options("data.xlsx", options)?;
//! # Ok::<(), unsheet::Error>(())
//! ```
//!
//! In lenient mode (the default) rows and worksheets that fail to decode
//! are logged through the `log` facade and left out. In strict mode they
//! are delivered as `Err` items and the rest of the workbook keeps going.
//!
//! ## Features
//!
//! - `async`: [`decode_workbook_async`] for Tokio callers

pub mod container;
pub mod decode;
pub mod detect;
pub mod error;
pub mod model;
pub mod reference;
pub mod xlsx;

// Re-exports
pub use container::{OoxmlContainer, Relationship, Relationships};
pub use decode::{
    CancellationToken, CellDecoder, DecodeOptions, ErrorMode, RowAssembler, Workbook,
    WorkbookDecoder, Worksheet, WorksheetDecoder,
};
pub use error::{Error, Result};
pub use model::{Cell, CellElement, CellType, CellValue, Row, RowElement, ValueKind};
pub use reference::{index_to_letters, letters_to_index, CellReference, Dimension};

use std::path::Path;

/// Decode the workbook at `path` with default options.
pub fn decode_workbook(path: impl AsRef<Path>) -> Result<Workbook> {
    decode_workbook_with_options(path, DecodeOptions::default())
}

/// Decode a workbook held in memory with default options.
///
/// # Example
///
/// ```no_run
/// let data = std::fs::read("data.xlsx")?;
/// let workbook = unsheet::decode_workbook_bytes(data)?;
/// println!("{} sheets", workbook.sheet_count());
/// # Ok::<(), unsheet::Error>(())
/// ```
pub fn decode_workbook_bytes(data: Vec<u8>) -> Result<Workbook> {
    WorkbookDecoder::new(DecodeOptions::default())?.decode_bytes(data)
}

pub fn decode_workbook_with_options(
    path: impl AsRef<Path>,
    options: DecodeOptions,
) -> Result<Workbook> {
    WorkbookDecoder::new(options)?.decode_path(path)
}

/// Decode a workbook from async code.
///
/// The file is read with Tokio; opening the package and loading the shared
/// strings run on the blocking pool. The returned streams are still
/// blocking, so drain them from `spawn_blocking` too.
#[cfg(feature = "async")]
pub async fn decode_workbook_async(
    path: impl AsRef<Path>,
    options: DecodeOptions,
) -> Result<Workbook> {
    let data = tokio::fs::read(path.as_ref()).await?;
    tokio::task::spawn_blocking(move || WorkbookDecoder::new(options)?.decode_bytes(data))
        .await
        .map_err(|e| Error::Join(e.to_string()))?
}
