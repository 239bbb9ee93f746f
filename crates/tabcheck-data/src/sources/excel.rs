//! XLSX row reader using calamine.
//!
//! The archive is buffered in memory before opening: the ZIP central
//! directory sits at the end of the file, so it cannot be read front to back.
//! Rows are then produced lazily from the selected sheet: the named one, or
//! the tab that was active when the workbook was saved.

use std::io::{Cursor, Read};
use std::sync::Arc;

use calamine::{Data, Range, Reader, Xlsx};
use chrono::{NaiveDate, NaiveDateTime};
use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use tracing::{debug, trace};
use zip::ZipArchive;

use crate::cell::{CellValue, RowContext};
use crate::config::WorkbookConfig;
use crate::error::{Result, WorkbookError};
use crate::format::DetectedFormat;
use crate::sources::RowSource;

/// Lazy reader over the rows of one worksheet
pub struct SheetRows {
    sheet_name: String,
    range: Range<Data>,
    headers: Arc<[String]>,
    /// Next physical row to read (0-based)
    next_row: usize,
    /// Last populated row (0-based), `None` for an empty sheet
    last_row: Option<usize>,
    last_col: usize,
    row_index: usize,
    trim: bool,
    skip_blank_rows: bool,
}

impl SheetRows {
    /// Buffer `reader`, open it as a workbook and select the configured sheet
    pub fn from_reader<R: Read>(mut reader: R, config: &WorkbookConfig) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        debug!(bytes = bytes.len(), "buffered spreadsheet archive");

        let active = active_tab(&bytes);
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
        let sheet_name =
            select_sheet(&workbook.sheet_names(), config.sheet_name.as_deref(), active)?;
        let range = workbook.worksheet_range(&sheet_name)?;
        debug!(sheet = %sheet_name, "selected worksheet");

        Ok(Self::from_range(sheet_name, range, config))
    }

    /// Build a reader over an already loaded sheet range
    pub fn from_range(sheet_name: String, range: Range<Data>, config: &WorkbookConfig) -> Self {
        let (last_row, last_col) = match range.end() {
            Some((row, col)) if !range.is_empty() => (Some(row as usize), col as usize),
            _ => (None, 0),
        };

        let header_row = config.header_row - 1;
        let mut headers: Vec<String> = Vec::new();
        if last_row.is_some_and(|last| header_row <= last) {
            headers = (0..=last_col)
                .map(|col| {
                    range
                        .get_value((header_row as u32, col as u32))
                        .map(|cell| convert_cell(cell, true).to_string())
                        .unwrap_or_default()
                })
                .collect();
            // Nothing past the last labelled column belongs to the header
            let width = headers.iter().rposition(|h| !h.is_empty()).map_or(0, |i| i + 1);
            headers.truncate(width);
        }

        Self {
            sheet_name,
            range,
            headers: headers.into(),
            next_row: config.data_row_start() - 1,
            last_row,
            last_col,
            row_index: 0,
            trim: config.trim,
            skip_blank_rows: config.skip_blank_rows,
        }
    }

    /// Name of the sheet being read
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn read_row(&self, row: usize) -> Vec<CellValue> {
        let mut values: Vec<CellValue> = (0..=self.last_col)
            .map(|col| {
                self.range
                    .get_value((row as u32, col as u32))
                    .map(|cell| convert_cell(cell, self.trim))
                    .unwrap_or(CellValue::Empty)
            })
            .collect();

        // Keep every labelled column, plus unlabelled ones up to the last value
        let last_value = values.iter().rposition(|v| !v.is_empty()).map_or(0, |i| i + 1);
        values.truncate(last_value.max(self.headers.len()));
        values
    }
}

impl Iterator for SheetRows {
    type Item = Result<RowContext>;

    fn next(&mut self) -> Option<Self::Item> {
        let last_row = self.last_row?;

        while self.next_row <= last_row {
            let row = self.next_row;
            self.next_row += 1;

            let values = self.read_row(row);
            if self.skip_blank_rows && values.iter().all(CellValue::is_empty) {
                trace!(row = row + 1, "skipping blank sheet row");
                continue;
            }

            self.row_index += 1;
            return Some(Ok(RowContext::new(
                self.row_index,
                row + 1,
                Arc::clone(&self.headers),
                values,
            )));
        }

        None
    }
}

impl RowSource for SheetRows {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn format(&self) -> DetectedFormat {
        DetectedFormat::Xlsx
    }
}

/// List the sheet names of a workbook, in workbook order
pub fn list_sheets<R: Read>(mut reader: R) -> Result<Vec<String>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    Ok(workbook.sheet_names())
}

/// Resolve the sheet to read: the named one, or the active one.
///
/// Without a usable active tab the first sheet is active.
fn select_sheet(
    names: &[String],
    requested: Option<&str>,
    active: Option<usize>,
) -> Result<String> {
    match requested {
        Some(name) => names
            .iter()
            .find(|n| n.as_str() == name)
            .cloned()
            .ok_or_else(|| {
                WorkbookError::SheetNotFound(format!(
                    "{} (available: {})",
                    name,
                    names.join(", ")
                ))
            }),
        None => active
            .and_then(|idx| names.get(idx))
            .or_else(|| names.first())
            .cloned()
            .ok_or(WorkbookError::NoSheets),
    }
}

/// Active tab recorded in `xl/workbook.xml`, if any
fn active_tab(archive: &[u8]) -> Option<usize> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).ok()?;
    let mut xml = Vec::new();
    zip.by_name("xl/workbook.xml")
        .ok()?
        .read_to_end(&mut xml)
        .ok()?;
    let active = parse_active_tab(&xml);
    debug!(?active, "read workbook view");
    active
}

/// `activeTab` of the first `<workbookView>` (0-based sheet position)
fn parse_active_tab(xml: &[u8]) -> Option<usize> {
    let mut reader = XmlReader::from_reader(xml);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => match e.local_name().as_ref() {
                b"workbookView" => {
                    return e
                        .attributes()
                        .filter_map(|a| a.ok())
                        .find(|attr| attr.key.as_ref() == b"activeTab")
                        .and_then(|attr| attr.unescape_value().ok()?.trim().parse().ok());
                }
                // bookViews always precedes sheets
                b"sheets" => return None,
                _ => {}
            },
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
        buf.clear();
    }
}

/// Convert a calamine cell, keeping its native type
fn convert_cell(cell: &Data, trim: bool) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::text(s.as_str(), trim),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                CellValue::Duration(dt.to_string())
            } else {
                dt.as_datetime()
                    .map(CellValue::DateTime)
                    .unwrap_or(CellValue::Float(dt.as_f64()))
            }
        }
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::text(s.as_str(), trim)),
        Data::DurationIso(s) => CellValue::Duration(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}
