//! Spreadsheet package detection.

use crate::container::OoxmlContainer;
use crate::error::{Error, Result};

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Content types of a workbook main part (.xlsx, .xlsm, .xltx, .xltm).
const WORKBOOK_CONTENT_TYPES: [&str; 4] = [
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml",
    "application/vnd.ms-excel.sheet.macroEnabled.main+xml",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.template.main+xml",
    "application/vnd.ms-excel.template.macroEnabled.main+xml",
];

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Verify that an opened container holds a spreadsheet workbook.
///
/// `[Content_Types].xml` is consulted first; packages that omit a workbook
/// override are accepted when they carry `xl/workbook.xml`.
pub fn ensure_spreadsheet(container: &OoxmlContainer) -> Result<()> {
    let content_types = match container.read_xml("[Content_Types].xml") {
        Ok(xml) => xml,
        Err(Error::MissingComponent(_)) => {
            return Err(Error::MissingComponent("[Content_Types].xml".to_string()))
        }
        Err(e) => return Err(e),
    };

    if WORKBOOK_CONTENT_TYPES
        .iter()
        .any(|ct| content_types.contains(ct))
        || container.exists("xl/workbook.xml")
    {
        Ok(())
    } else {
        Err(Error::UnknownFormat)
    }
}
