//! Workbook package: shared strings and worksheet part discovery.

use crate::container::OoxmlContainer;
use crate::detect::{ensure_spreadsheet, is_zip_file};
use crate::error::{Error, Result};
use quick_xml::events::Event;
use std::path::Path;

use super::shared_strings::SharedStrings;

const WORKBOOK_PART: &str = "xl/workbook.xml";
const DEFAULT_SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// A worksheet listed in `xl/workbook.xml`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorksheetPart {
    /// Sheet name as shown on its tab
    pub name: String,
    /// Position in workbook order, starting at 0
    pub index: usize,
    /// Part path inside the package, or `None` when the relationship is missing
    pub path: Option<String>,
}

/// An opened spreadsheet package.
///
/// Opening loads the shared string table; worksheet parts are read on
/// demand with [`WorkbookPackage::read_worksheet`].
#[derive(Debug)]
pub struct WorkbookPackage {
    container: OoxmlContainer,
    shared_strings: SharedStrings,
    worksheets: Vec<WorksheetPart>,
}

impl WorkbookPackage {
    /// Open a package from a file path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_container(OoxmlContainer::open(path)?)
    }

    /// Open a package from bytes.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        if !is_zip_file(&data) {
            return Err(Error::UnknownFormat);
        }
        Self::from_container(OoxmlContainer::from_bytes(data)?)
    }

    /// Load the shared strings and sheet list of an opened container.
    pub fn from_container(container: OoxmlContainer) -> Result<Self> {
        ensure_spreadsheet(&container)?;

        let rels = container.read_relationships(WORKBOOK_PART)?;

        let shared_strings_path = rels
            .find_by_type_suffix("/sharedStrings")
            .map(|r| OoxmlContainer::resolve_path(WORKBOOK_PART, &r.target))
            .unwrap_or_else(|| DEFAULT_SHARED_STRINGS_PART.to_string());
        let shared_strings = match container.read_xml(&shared_strings_path) {
            Ok(xml) => SharedStrings::parse(&xml)?,
            Err(Error::MissingComponent(_)) => {
                log::debug!("no shared string part at {}", shared_strings_path);
                SharedStrings::default()
            }
            Err(e) => return Err(e),
        };

        let xml = container.read_xml(WORKBOOK_PART)?;
        let worksheets = parse_sheet_list(&xml)?
            .into_iter()
            .enumerate()
            .map(|(index, (name, rel_id))| {
                let path = rels
                    .get(&rel_id)
                    .filter(|r| !r.external)
                    .map(|r| OoxmlContainer::resolve_path(WORKBOOK_PART, &r.target));
                WorksheetPart { name, index, path }
            })
            .collect();

        Ok(Self {
            container,
            shared_strings,
            worksheets,
        })
    }

    pub fn shared_strings(&self) -> &SharedStrings {
        &self.shared_strings
    }

    /// Hand the shared string table over, keeping the rest of the package.
    pub fn take_shared_strings(&mut self) -> SharedStrings {
        std::mem::take(&mut self.shared_strings)
    }

    /// Worksheets in workbook order.
    pub fn worksheet_parts(&self) -> &[WorksheetPart] {
        &self.worksheets
    }

    /// Read the XML of a worksheet part.
    pub fn read_worksheet(&self, part: &WorksheetPart) -> Result<String> {
        let path = part
            .path
            .as_deref()
            .ok_or_else(|| Error::MissingComponent(format!("relationship for {}", part.name)))?;
        self.container.read_xml(path)
    }

    pub fn container(&self) -> &OoxmlContainer {
        &self.container
    }
}

/// `(name, relationship id)` of every `<sheet>` in workbook order.
fn parse_sheet_list(xml: &str) -> Result<Vec<(String, String)>> {
    let mut sheets = Vec::new();
    let mut reader = quick_xml::Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"sheet" => {
                let mut name = String::new();
                let mut rel_id = String::new();

                for attr in e.attributes().flatten() {
                    let value = attr
                        .unescape_value()
                        .map(|v| v.to_string())
                        .unwrap_or_else(|_| String::from_utf8_lossy(&attr.value).to_string());
                    match attr.key.as_ref() {
                        b"name" => name = value,
                        _ if attr.key.local_name().as_ref() == b"id" => rel_id = value,
                        _ => {}
                    }
                }

                if !name.is_empty() {
                    sheets.push((name, rel_id));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    Ok(sheets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    const CONTENT_TYPES: &str = r#"<Types><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/></Types>"#;

    const WORKBOOK: &str = r#"<workbook xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets>
    <sheet name="Data &amp; More" sheetId="1" r:id="rId1"/>
    <sheet name="Orphan" sheetId="2" r:id="rId9"/>
  </sheets>
</workbook>"#;

    const RELS: &str = r#"<Relationships>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="strings.xml"/>
</Relationships>"#;

    fn build(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(data.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    #[test]
    fn test_open_package() {
        let data = build(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("xl/workbook.xml", WORKBOOK),
            ("xl/_rels/workbook.xml.rels", RELS),
            ("xl/strings.xml", "<sst><si><t>x</t></si></sst>"),
            ("xl/worksheets/sheet1.xml", "<worksheet/>"),
        ]);
        let package = WorkbookPackage::from_bytes(data).unwrap();

        assert_eq!(package.shared_strings().get(0), Some("x"));

        let parts = package.worksheet_parts();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].name, "Data & More");
        assert_eq!(parts[0].path.as_deref(), Some("xl/worksheets/sheet1.xml"));
        assert_eq!(parts[1].index, 1);
        assert_eq!(parts[1].path, None);

        assert_eq!(package.read_worksheet(&parts[0]).unwrap(), "<worksheet/>");
        assert!(matches!(
            package.read_worksheet(&parts[1]),
            Err(Error::MissingComponent(_))
        ));
    }

    #[test]
    fn test_missing_shared_strings() {
        let data = build(&[
            ("[Content_Types].xml", CONTENT_TYPES),
            ("xl/workbook.xml", "<workbook><sheets/></workbook>"),
        ]);
        let package = WorkbookPackage::from_bytes(data).unwrap();
        assert!(package.shared_strings().is_empty());
        assert!(package.worksheet_parts().is_empty());
    }

    #[test]
    fn test_not_a_spreadsheet() {
        let data = build(&[("[Content_Types].xml", "<Types/>")]);
        assert!(matches!(
            WorkbookPackage::from_bytes(data),
            Err(Error::UnknownFormat)
        ));
        assert!(matches!(
            WorkbookPackage::from_bytes(b"id,name\n1,x".to_vec()),
            Err(Error::UnknownFormat)
        ));
    }
}
