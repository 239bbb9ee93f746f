//! CSV row reader.
//!
//! Physical rows are CSV records: quoted fields may span lines and blank
//! lines are not records at all, so `header_row = 3` means the third record.

use std::io::Read;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::cell::{CellValue, RowContext};
use crate::config::WorkbookConfig;
use crate::error::Result;
use crate::format::DetectedFormat;
use crate::sources::RowSource;

/// Lazy reader over CSV records
pub struct CsvRows<R> {
    records: csv::StringRecordsIntoIter<R>,
    headers: Arc<[String]>,
    /// Last physical row consumed (1-based)
    physical_row: usize,
    data_row_start: usize,
    row_index: usize,
    skip_blank_rows: bool,
    done: bool,
}

impl<R: Read> CsvRows<R> {
    /// Open `reader` and consume everything up to and including the header row
    pub fn new(reader: R, config: &WorkbookConfig) -> Result<Self> {
        let mut records = csv::ReaderBuilder::new()
            .delimiter(config.delimiter_byte()?)
            .has_headers(false) // We locate the header row ourselves
            .flexible(true)
            .trim(if config.trim {
                csv::Trim::All
            } else {
                csv::Trim::None
            })
            .from_reader(reader)
            .into_records();

        let mut physical_row = 0;
        let mut headers = Vec::new();
        while physical_row < config.header_row {
            let Some(record) = records.next() else {
                break;
            };
            let record = record?;
            physical_row += 1;
            if physical_row == config.header_row {
                headers = record.iter().map(str::to_string).collect();
            }
        }
        debug!(columns = headers.len(), header_row = config.header_row, "csv headers read");

        Ok(Self {
            records,
            headers: headers.into(),
            physical_row,
            data_row_start: config.data_row_start(),
            row_index: 0,
            skip_blank_rows: config.skip_blank_rows,
            done: false,
        })
    }
}

impl<R: Read> Iterator for CsvRows<R> {
    type Item = Result<RowContext>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let record = match self.records.next() {
                None => {
                    self.done = true;
                    return None;
                }
                Some(Err(e)) => {
                    self.done = true;
                    return Some(Err(e.into()));
                }
                Some(Ok(record)) => record,
            };
            self.physical_row += 1;

            if self.physical_row < self.data_row_start {
                continue;
            }

            // Trimming already happened in the parser
            let values: Vec<CellValue> = record.iter().map(|v| CellValue::text(v, false)).collect();
            if self.skip_blank_rows && values.iter().all(CellValue::is_empty) {
                trace!(row = self.physical_row, "skipping blank csv row");
                continue;
            }

            self.row_index += 1;
            return Some(Ok(RowContext::new(
                self.row_index,
                self.physical_row,
                Arc::clone(&self.headers),
                values,
            )));
        }
    }
}

impl<R: Read> RowSource for CsvRows<R> {
    fn headers(&self) -> &[String] {
        &self.headers
    }

    fn format(&self) -> DetectedFormat {
        DetectedFormat::Csv
    }
}
