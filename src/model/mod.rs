//! Decoded spreadsheet data.
//!
//! Raw elements ([`CellElement`], [`RowElement`]) are what the package layer
//! extracts from worksheet XML. Decoding turns them into typed [`CellValue`]s
//! gathered into column-aligned [`Row`]s.

mod element;
mod row;
mod value;

pub use element::*;
pub use row::*;
pub use value::*;
