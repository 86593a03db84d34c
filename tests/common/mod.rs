//! Builds small XLSX packages in memory for integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const WORKBOOK_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const WORKSHEET_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const SHARED_STRINGS_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

#[derive(Default)]
pub struct WorkbookBuilder {
    sheets: Vec<(String, String)>,
    shared_strings: Option<Vec<String>>,
}

impl WorkbookBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared_strings(mut self, strings: &[&str]) -> Self {
        self.shared_strings = Some(strings.iter().map(|s| s.to_string()).collect());
        self
    }

    /// Add a sheet from the inner XML of `<sheetData>`.
    pub fn sheet(self, name: &str, dimension: Option<&str>, sheet_data: &str) -> Self {
        let dimension = dimension
            .map(|d| format!(r#"<dimension ref="{}"/>"#, d))
            .unwrap_or_default();
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{}">{}<sheetData>{}</sheetData></worksheet>"#,
            MAIN_NS, dimension, sheet_data
        );
        self.raw_sheet(name, &xml)
    }

    /// Add a sheet with verbatim part content.
    pub fn raw_sheet(mut self, name: &str, xml: &str) -> Self {
        self.sheets.push((name.to_string(), xml.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        let mut put = |path: &str, content: &str| {
            zip.start_file(path, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        put(
            "[Content_Types].xml",
            &format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
<Default Extension="xml" ContentType="application/xml"/>
<Override PartName="/xl/workbook.xml" ContentType="{}"/>
</Types>"#,
                WORKBOOK_CONTENT_TYPE
            ),
        );

        let mut sheets = String::new();
        let mut rels = String::new();
        for (i, (name, xml)) in self.sheets.iter().enumerate() {
            let n = i + 1;
            sheets.push_str(&format!(
                r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
                name, n, n
            ));
            rels.push_str(&format!(
                r#"<Relationship Id="rId{}" Type="{}" Target="worksheets/sheet{}.xml"/>"#,
                n, WORKSHEET_REL, n
            ));
            put(&format!("xl/worksheets/sheet{}.xml", n), xml);
        }

        if let Some(strings) = &self.shared_strings {
            rels.push_str(&format!(
                r#"<Relationship Id="rIdSst" Type="{}" Target="sharedStrings.xml"/>"#,
                SHARED_STRINGS_REL
            ));
            let items: String = strings
                .iter()
                .map(|s| format!("<si><t>{}</t></si>", s))
                .collect();
            put(
                "xl/sharedStrings.xml",
                &format!(
                    r#"<sst xmlns="{}" count="{}" uniqueCount="{}">{}</sst>"#,
                    MAIN_NS,
                    strings.len(),
                    strings.len(),
                    items
                ),
            );
        }

        put(
            "xl/workbook.xml",
            &format!(
                r#"<workbook xmlns="{}" xmlns:r="{}"><sheets>{}</sheets></workbook>"#,
                MAIN_NS, REL_NS, sheets
            ),
        );
        put(
            "xl/_rels/workbook.xml.rels",
            &format!(
                r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{}</Relationships>"#,
                rels
            ),
        );

        zip.finish().unwrap().into_inner()
    }
}

/// `<row>` XML with one cell per `(reference, type, value)`.
pub fn row(number: u32, cells: &[(&str, Option<&str>, Option<&str>)]) -> String {
    let cells: String = cells
        .iter()
        .map(|(r, t, v)| {
            let t = t.map(|t| format!(r#" t="{}""#, t)).unwrap_or_default();
            match v {
                Some(v) => format!(r#"<c r="{}"{}><v>{}</v></c>"#, r, t, v),
                None => format!(r#"<c r="{}"{}/>"#, r, t),
            }
        })
        .collect();
    format!(r#"<row r="{}">{}</row>"#, number, cells)
}
