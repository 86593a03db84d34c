//! Raw worksheet elements, before type decoding.

/// One `<c>` element as extracted from worksheet XML.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellElement {
    /// A1-style reference (e.g., "C4")
    pub reference: String,
    /// The `t` attribute, if any
    pub declared_type: Option<String>,
    /// Text of `<v>`, or of `<is>` for inline strings
    pub raw_value: Option<String>,
}

impl CellElement {
    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            ..Default::default()
        }
    }

    /// Set the declared type tag.
    pub fn with_type(mut self, tag: impl Into<String>) -> Self {
        self.declared_type = Some(tag.into());
        self
    }

    /// Set the raw literal.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.raw_value = Some(value.into());
        self
    }
}

/// One `<row>` element with its cells in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowElement {
    /// 1-based row number
    pub number: u32,
    pub cells: Vec<CellElement>,
}

impl RowElement {
    pub fn new(number: u32, cells: Vec<CellElement>) -> Self {
        Self { number, cells }
    }
}
