//! Worksheet XML extraction.
//!
//! Pulls the dimension hint and the `<row>`/`<c>` element stream out of a
//! worksheet part. Values are left as raw text; typing happens in
//! [`crate::decode`].

use crate::error::{Error, Result};
use crate::model::{CellElement, RowElement};
use crate::reference::{index_to_letters, letters_to_index, split_reference};
use quick_xml::events::{BytesStart, Event};

/// Raw content of one worksheet part.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetData {
    /// The `ref` of `<dimension>`, unparsed
    pub dimension_hint: Option<String>,
    /// Rows in source order
    pub rows: Vec<RowElement>,
}

impl SheetData {
    pub fn new(dimension_hint: Option<String>, rows: Vec<RowElement>) -> Self {
        Self {
            dimension_hint,
            rows,
        }
    }

    /// Extract rows and cells from worksheet XML.
    ///
    /// Rows without `r` continue from the previous row; cells without `r`
    /// continue from the previous cell of the same row.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = quick_xml::Reader::from_str(xml);
        let mut buf = Vec::new();

        let mut data = SheetData::default();
        let mut current_row: Option<RowElement> = None;
        let mut current_cell: Option<CellElement> = None;
        let mut last_row_number = 0u32;
        let mut last_column = 0u32;
        let mut in_value = false;
        let mut in_phonetic = false;
        let mut saw_worksheet = false;
        let mut depth = 0usize;

        loop {
            let event = reader.read_event_into(&mut buf);
            match &event {
                Ok(Event::Start(_)) => depth += 1,
                Ok(Event::End(_)) => depth = depth.saturating_sub(1),
                _ => {}
            }

            match event {
                Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                    b"worksheet" => saw_worksheet = true,
                    b"row" => {
                        let number = row_number(e, last_row_number)?;
                        last_row_number = number;
                        last_column = 0;
                        current_row = Some(RowElement::new(number, Vec::new()));
                    }
                    b"c" if current_row.is_some() => {
                        current_cell = Some(cell_start(e, last_row_number, &mut last_column)?);
                    }
                    b"v" if current_cell.is_some() => {
                        in_value = true;
                        set_raw(&mut current_cell, String::new());
                    }
                    b"rPh" if current_cell.is_some() => in_phonetic = true,
                    b"t" if current_cell.is_some() && !in_phonetic => {
                        // <is><t> of an inline string; rich runs concatenate
                        in_value = true;
                        if raw_is_none(&current_cell) {
                            set_raw(&mut current_cell, String::new());
                        }
                    }
                    _ => {}
                },
                Ok(Event::Empty(ref e)) => match e.local_name().as_ref() {
                    b"worksheet" => saw_worksheet = true,
                    b"dimension" => data.dimension_hint = attr(e, b"ref"),
                    b"row" => {
                        let number = row_number(e, last_row_number)?;
                        last_row_number = number;
                        data.rows.push(RowElement::new(number, Vec::new()));
                    }
                    b"c" if current_row.is_some() => {
                        let cell = cell_start(e, last_row_number, &mut last_column)?;
                        if let Some(row) = current_row.as_mut() {
                            row.cells.push(cell);
                        }
                    }
                    b"v" if current_cell.is_some() => set_raw(&mut current_cell, String::new()),
                    _ => {}
                },
                Ok(Event::Text(ref e)) if in_value => {
                    let text = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    push_raw(&mut current_cell, &text);
                }
                Ok(Event::CData(ref e)) if in_value => {
                    push_raw(&mut current_cell, &String::from_utf8_lossy(e));
                }
                Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                    b"v" | b"t" => in_value = false,
                    b"rPh" => in_phonetic = false,
                    b"c" => {
                        in_phonetic = false;
                        if let (Some(cell), Some(row)) = (current_cell.take(), current_row.as_mut())
                        {
                            row.cells.push(cell);
                        }
                    }
                    b"row" => {
                        if let Some(row) = current_row.take() {
                            data.rows.push(row);
                        }
                    }
                    _ => {}
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::XmlParse(e.to_string())),
                _ => {}
            }
            drop(event);
            buf.clear();
        }

        if !saw_worksheet {
            return Err(Error::XmlParse("no <worksheet> root element".to_string()));
        }
        if depth > 0 {
            return Err(Error::XmlParse("unexpected end of document".to_string()));
        }

        Ok(data)
    }
}

fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).to_string())
}

fn row_number(e: &BytesStart<'_>, previous: u32) -> Result<u32> {
    match attr(e, b"r") {
        Some(r) => r
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| Error::XmlParse(format!("invalid row number {:?}", r))),
        None => Ok(previous + 1),
    }
}

/// Read the attributes of `<c>`, synthesizing a reference when `r` is absent.
fn cell_start(e: &BytesStart<'_>, row: u32, last_column: &mut u32) -> Result<CellElement> {
    let reference = match attr(e, b"r") {
        Some(r) => {
            // Column tracking is best effort; a bad reference is reported by
            // the cell decoder.
            if let Ok(parts) = split_reference(&r) {
                if let Ok(column) = letters_to_index(parts.letters) {
                    *last_column = column;
                }
            }
            r
        }
        None => {
            *last_column = last_column.saturating_add(1);
            format!("{}{}", index_to_letters(*last_column)?, row)
        }
    };

    Ok(CellElement {
        reference,
        declared_type: attr(e, b"t"),
        raw_value: None,
    })
}

fn raw_is_none(cell: &Option<CellElement>) -> bool {
    cell.as_ref().is_some_and(|c| c.raw_value.is_none())
}

fn set_raw(cell: &mut Option<CellElement>, value: String) {
    if let Some(c) = cell.as_mut() {
        c.raw_value = Some(value);
    }
}

fn push_raw(cell: &mut Option<CellElement>, text: &str) {
    if let Some(c) = cell.as_mut() {
        c.raw_value.get_or_insert_with(String::new).push_str(text);
    }
}
