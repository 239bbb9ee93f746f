//! In-memory XLSX fixtures for tests
//!
//! Builds just enough of a SpreadsheetML package for `calamine` to read:
//! workbook, relationships, shared strings, a date style and one worksheet
//! per sheet. Entries are deflated like a real spreadsheet export.
//!
//! # Example
//! ```ignore
//! use tabcheck_data::test_utils::XlsxBuilder;
//! let bytes = XlsxBuilder::new()
//!     .sheet("Customers", &[&["code", "name"], &["A1", "Alice"]])
//!     .build();
//! ```

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

/// A cell in a fixture sheet
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Shared-string text
    Text(String),
    /// Numeric cell
    Number(f64),
    /// Boolean cell
    Bool(bool),
    /// Excel date serial rendered with a date format
    Date(f64),
    /// No cell written
    Blank,
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            Cell::Blank
        } else {
            Cell::Text(value.to_string())
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

/// Builder for a minimal XLSX workbook
#[derive(Debug, Default)]
pub struct XlsxBuilder {
    sheets: Vec<(String, Vec<Vec<Cell>>)>,
    active_tab: Option<usize>,
}

impl XlsxBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet of text cells (`""` is a blank cell)
    pub fn sheet(self, name: &str, rows: &[&[&str]]) -> Self {
        let rows = rows
            .iter()
            .map(|row| row.iter().map(|v| Cell::from(*v)).collect())
            .collect();
        self.sheet_cells(name, rows)
    }

    /// Add a sheet of typed cells
    pub fn sheet_cells(mut self, name: &str, rows: Vec<Vec<Cell>>) -> Self {
        self.sheets.push((name.to_string(), rows));
        self
    }

    /// Record `idx` (0-based) as the active tab
    pub fn active_tab(mut self, idx: usize) -> Self {
        self.active_tab = Some(idx);
        self
    }

    /// Serialize the workbook to XLSX bytes
    pub fn build(self) -> Vec<u8> {
        let mut shared: Vec<String> = Vec::new();
        let worksheets: Vec<String> = self
            .sheets
            .iter()
            .map(|(_, rows)| worksheet_xml(rows, &mut shared))
            .collect();

        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut write = |path: &str, content: &str| {
            zip.start_file(path, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        };

        write("[Content_Types].xml", &content_types_xml(self.sheets.len()));
        write(
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#,
        );
        write("xl/workbook.xml", &workbook_xml(&self.sheets, self.active_tab));
        write("xl/_rels/workbook.xml.rels", &workbook_rels_xml(self.sheets.len()));
        write("xl/styles.xml", STYLES_XML);
        write("xl/sharedStrings.xml", &shared_strings_xml(&shared));
        for (idx, sheet) in worksheets.iter().enumerate() {
            write(&format!("xl/worksheets/sheet{}.xml", idx + 1), sheet);
        }

        zip.finish().unwrap();
        buffer.into_inner()
    }
}

/// Column letters for a 0-based column index (0 → A, 26 → AA)
pub fn column_name(mut idx: usize) -> String {
    let mut name = Vec::new();
    loop {
        name.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    name.reverse();
    String::from_utf8(name).unwrap()
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn worksheet_xml(rows: &[Vec<Cell>], shared: &mut Vec<String>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );

    for (row_idx, row) in rows.iter().enumerate() {
        if row.iter().all(|c| *c == Cell::Blank) {
            continue;
        }
        let r = row_idx + 1;
        xml.push_str(&format!(r#"<row r="{}">"#, r));
        for (col_idx, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_name(col_idx), r);
            match cell {
                Cell::Blank => {}
                Cell::Text(text) => {
                    shared.push(text.clone());
                    xml.push_str(&format!(
                        r#"<c r="{}" t="s"><v>{}</v></c>"#,
                        reference,
                        shared.len() - 1
                    ));
                }
                Cell::Number(n) => {
                    xml.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, n));
                }
                Cell::Bool(b) => {
                    xml.push_str(&format!(
                        r#"<c r="{}" t="b"><v>{}</v></c>"#,
                        reference,
                        u8::from(*b)
                    ));
                }
                Cell::Date(serial) => {
                    xml.push_str(&format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, reference, serial));
                }
            }
        }
        xml.push_str("</row>");
    }

    xml.push_str("</sheetData></worksheet>");
    xml
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>
  <Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
    );
    for idx in 1..=sheet_count {
        xml.push_str(&format!(
            r#"
  <Override PartName="/xl/worksheets/sheet{}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
            idx
        ));
    }
    xml.push_str("\n</Types>");
    xml
}

fn workbook_xml(sheets: &[(String, Vec<Vec<Cell>>)], active_tab: Option<usize>) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    if let Some(idx) = active_tab {
        xml.push_str(&format!(
            r#"<bookViews><workbookView activeTab="{}"/></bookViews>"#,
            idx
        ));
    }
    xml.push_str("<sheets>");
    for (idx, (name, _)) in sheets.iter().enumerate() {
        xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name),
            idx + 1,
            idx + 1
        ));
    }
    xml.push_str("</sheets></workbook>");
    xml
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
    );
    for idx in 1..=sheet_count {
        xml.push_str(&format!(
            r#"
  <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{}.xml"/>"#,
            idx, idx
        ));
    }
    xml.push_str(&format!(
        r#"
  <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>
  <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/>
</Relationships>"#,
        sheet_count + 1,
        sheet_count + 2
    ));
    xml
}

fn shared_strings_xml(strings: &[String]) -> String {
    let mut xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
        strings.len(),
        strings.len()
    );
    for s in strings {
        xml.push_str(&format!("<si><t>{}</t></si>", escape(s)));
    }
    xml.push_str("</sst>");
    xml
}

// xf 0 is General, xf 1 is the built-in short date format (numFmtId 14)
const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="14" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
</styleSheet>"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_name() {
        assert_eq!(column_name(0), "A");
        assert_eq!(column_name(25), "Z");
        assert_eq!(column_name(26), "AA");
        assert_eq!(column_name(27), "AB");
        assert_eq!(column_name(52), "BA");
    }

    #[test]
    fn test_build_starts_with_zip_magic() {
        let bytes = XlsxBuilder::new().sheet("Sheet1", &[&["a"]]).build();
        assert!(bytes.starts_with(b"PK\x03\x04"));
    }
}
