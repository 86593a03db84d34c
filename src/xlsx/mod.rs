//! XLSX package layer.
//!
//! Opens the package, loads the shared string table and extracts the raw
//! row/cell element stream of each worksheet. Typing and assembly live in
//! [`crate::decode`].
//!
//! # Example
//!
//! ```no_run
//! use unsheet::xlsx::{SheetData, WorkbookPackage};
//!
//! let package = WorkbookPackage::open("data.xlsx")?;
//! for part in package.worksheet_parts() {
//!     let sheet = SheetData::parse(&package.read_worksheet(part)?)?;
//!     println!("{}: {} rows", part.name, sheet.rows.len());
//! }
//! # Ok::<(), unsheet::Error>(())
//! ```

mod package;
mod shared_strings;
mod sheet;

pub use package::{WorkbookPackage, WorksheetPart};
pub use shared_strings::SharedStrings;
pub use sheet::SheetData;
