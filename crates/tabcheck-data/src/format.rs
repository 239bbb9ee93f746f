//! Format detection.
//!
//! Resolution order, first match wins:
//!
//! 1. an explicit hint other than [`TabularFormat::Auto`]
//! 2. the file name extension (`.csv`, `.xlsx`, `.xlsm`)
//! 3. a character-oriented input ([`InputStream::Text`]) is CSV
//! 4. the first bytes: ZIP magic means XLSX, anything else CSV
//!
//! Sniffing reads at most four bytes, however short the underlying reads
//! are. [`detect_format`] hands back a [`Sniffed`] stream that replays them,
//! so row reading still starts at the first byte.

use std::io::{self, Read};
use std::path::Path;

use tracing::debug;

use crate::config::TabularFormat;
use crate::error::Result;

/// ZIP local file header signature
pub const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Stream after detection: the sniffed prefix, then the rest of the input
pub type Sniffed<R> = io::Chain<io::Cursor<Vec<u8>>, R>;

/// A concrete format decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    /// Delimited text
    Csv,
    /// Spreadsheet archive
    Xlsx,
}

/// Input stream for one validation run
#[derive(Debug)]
pub enum InputStream<R> {
    /// Already-decoded text (always treated as CSV under `auto`)
    Text(R),
    /// Raw bytes of unknown format
    Bytes(R),
}

impl<'a> InputStream<io::Cursor<&'a [u8]>> {
    /// Text input backed by a string slice
    pub fn from_text(text: &'a str) -> Self {
        InputStream::Text(io::Cursor::new(text.as_bytes()))
    }

    /// Byte input backed by a slice
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        InputStream::Bytes(io::Cursor::new(bytes))
    }
}

impl<R> InputStream<R> {
    /// Check if the stream is character-oriented
    pub fn is_text(&self) -> bool {
        matches!(self, InputStream::Text(_))
    }

    /// Unwrap the underlying reader
    pub fn into_inner(self) -> R {
        match self {
            InputStream::Text(r) | InputStream::Bytes(r) => r,
        }
    }

    /// Wrap the underlying reader, keeping the stream kind
    pub fn map<S>(self, f: impl FnOnce(R) -> S) -> InputStream<S> {
        match self {
            InputStream::Text(r) => InputStream::Text(f(r)),
            InputStream::Bytes(r) => InputStream::Bytes(f(r)),
        }
    }

    fn get_mut(&mut self) -> &mut R {
        match self {
            InputStream::Text(r) | InputStream::Bytes(r) => r,
        }
    }
}

impl<R: Read> InputStream<R> {
    /// Check whether the stream starts with [`ZIP_MAGIC`].
    ///
    /// The returned stream yields the checked bytes again before the rest.
    pub fn sniff_zip_magic(mut self) -> io::Result<(bool, InputStream<Sniffed<R>>)> {
        let mut prefix = Vec::with_capacity(ZIP_MAGIC.len());
        self.get_mut()
            .by_ref()
            .take(ZIP_MAGIC.len() as u64)
            .read_to_end(&mut prefix)?;
        let is_zip = prefix == ZIP_MAGIC;
        Ok((is_zip, self.map(|r| replay(prefix, r))))
    }

    fn unsniffed(self) -> InputStream<Sniffed<R>> {
        self.map(|r| replay(Vec::new(), r))
    }
}

fn replay<R: Read>(prefix: Vec<u8>, rest: R) -> Sniffed<R> {
    io::Cursor::new(prefix).chain(rest)
}

impl<R: Read> Read for InputStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.get_mut().read(buf)
    }
}

/// Format implied by a file name, if any
pub fn format_from_file_name(file_name: &str) -> Option<DetectedFormat> {
    let ext = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "csv" => Some(DetectedFormat::Csv),
        "xlsx" | "xlsm" => Some(DetectedFormat::Xlsx),
        _ => None,
    }
}

/// Decide between CSV and XLSX for this input.
///
/// Returns the decision with the stream to read rows from.
pub fn detect_format<R: Read>(
    hint: TabularFormat,
    file_name: Option<&str>,
    input: InputStream<R>,
) -> Result<(DetectedFormat, InputStream<Sniffed<R>>)> {
    match hint {
        TabularFormat::Csv => return Ok((DetectedFormat::Csv, input.unsniffed())),
        TabularFormat::Xlsx => return Ok((DetectedFormat::Xlsx, input.unsniffed())),
        TabularFormat::Auto => {}
    }

    if let Some(format) = file_name.and_then(format_from_file_name) {
        debug!(?format, file_name, "format chosen from file name");
        return Ok((format, input.unsniffed()));
    }

    if input.is_text() {
        debug!("text stream, treating as csv");
        return Ok((DetectedFormat::Csv, input.unsniffed()));
    }

    let (is_zip, input) = input.sniff_zip_magic()?;
    let format = if is_zip {
        DetectedFormat::Xlsx
    } else {
        DetectedFormat::Csv
    };
    debug!(?format, "format chosen by sniffing");
    Ok((format, input))
}
