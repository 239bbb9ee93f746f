//! Row readers.
//!
//! Both readers turn an input stream into a lazy sequence of [`RowContext`]
//! values, numbered from 1 over the data region. [`open_rows`] picks the
//! reader after format detection.

pub mod csv;
pub mod excel;

pub use self::csv::CsvRows;
pub use self::excel::{list_sheets, SheetRows};

use std::io::{self, BufRead, Read};

use tracing::debug;

use crate::cell::RowContext;
use crate::config::WorkbookConfig;
use crate::error::{Result, SizeLimitExceeded};
use crate::format::{detect_format, DetectedFormat, InputStream};

/// A lazy, single-pass sequence of data rows
pub trait RowSource: Iterator<Item = Result<RowContext>> {
    /// Header labels, in column order
    fn headers(&self) -> &[String];

    /// Format this reader decodes
    fn format(&self) -> DetectedFormat;
}

/// Type-erased row reader
pub type BoxedRows<'r> = Box<dyn RowSource + 'r>;

/// Detect the format of `input` and open the matching reader.
///
/// The header row is read here; data rows are read on demand.
pub fn open_rows<'r, R: BufRead + 'r>(
    input: InputStream<R>,
    config: &WorkbookConfig,
    file_name: Option<&str>,
) -> Result<BoxedRows<'r>> {
    config.validate()?;
    let (format, input) = detect_format(config.format, file_name, input)?;
    debug!(?format, file_name, "opening row reader");

    let reader = SizeLimited::new(input, config.max_file_size_bytes);
    match format {
        DetectedFormat::Csv => Ok(Box::new(CsvRows::new(reader, config)?)),
        DetectedFormat::Xlsx => Ok(Box::new(SheetRows::from_reader(reader, config)?)),
    }
}

/// Reader that fails once more than `limit` bytes have been read
#[derive(Debug)]
pub struct SizeLimited<R> {
    inner: R,
    limit: Option<u64>,
    consumed: u64,
}

impl<R> SizeLimited<R> {
    /// Wrap `inner`; `None` disables the limit
    pub fn new(inner: R, limit: Option<u64>) -> Self {
        Self {
            inner,
            limit,
            consumed: 0,
        }
    }

    /// Bytes read so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}

impl<R: Read> Read for SizeLimited<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.consumed += n as u64;
        if let Some(limit) = self.limit {
            if self.consumed > limit {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    SizeLimitExceeded { limit },
                ));
            }
        }
        Ok(n)
    }
}
