//! Sparse row assembly.

use super::cell::CellDecoder;
use crate::error::{Error, Result};
use crate::model::{CellValue, Row, RowElement};

/// Builds column-aligned rows from raw row elements.
#[derive(Debug, Clone, Copy)]
pub struct RowAssembler<'a> {
    decoder: CellDecoder<'a>,
}

impl<'a> RowAssembler<'a> {
    pub fn new(decoder: CellDecoder<'a>) -> Self {
        Self { decoder }
    }

    /// Decode the cells of `element` and pad skipped columns with `Empty`.
    ///
    /// A row without cells yields `None` rather than an empty `Row`. Cells
    /// must arrive in strictly ascending column order; they are never
    /// re-sorted.
    pub fn assemble(&self, element: &RowElement) -> Result<Option<Row>> {
        if element.cells.is_empty() {
            return Ok(None);
        }

        let mut cells = Vec::with_capacity(element.cells.len());
        let mut previous = 0u32;
        for raw in &element.cells {
            let cell = self.decoder.decode(raw)?;
            let column = cell.reference.column;
            if column <= previous {
                return Err(Error::OutOfOrderCells {
                    row: element.number,
                    previous,
                    column,
                });
            }
            previous = column;
            cells.push(cell);
        }

        let mut values = Vec::with_capacity(previous as usize);
        for cell in &cells {
            values.resize(cell.reference.column_zero_based(), CellValue::Empty);
            values.push(cell.value.clone());
        }

        Ok(Some(Row {
            number: element.number,
            cells,
            values,
        }))
    }
}
