//! # tabcheck-data
//!
//! Input side of tabcheck: turn an uploaded CSV or XLSX stream into a lazy
//! sequence of raw rows.
//!
//! ## Features
//!
//! - **Format detection**: explicit hint, file extension, stream kind, or
//!   ZIP magic sniffing that replays the bytes it reads
//! - **CSV**: streamed through `csv` with configurable delimiter and offsets
//! - **Excel Support**: `.xlsx`/`.xlsm` sheets via `calamine`, keeping
//!   native numeric, boolean and date cells
//!
//! ## Example
//!
//! ```rust
//! use tabcheck_data::{open_rows, InputStream, WorkbookConfig};
//!
//! let input = InputStream::from_text("code,name\nA1,Alice\n");
//! let rows = open_rows(input, &WorkbookConfig::default(), Some("upload.csv"))?;
//!
//! for row in rows {
//!     let row = row?;
//!     println!("{}: {:?}", row.row_index, row.raw);
//! }
//! # Ok::<(), tabcheck_data::WorkbookError>(())
//! ```

pub mod cell;
pub mod config;
pub mod error;
pub mod format;
pub mod sources;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-exports
pub use cell::{column_key, CellValue, RowContext, RowMap};
pub use config::{parse_file_size, ExtraPolicy, TabularFormat, WorkbookConfig};
pub use error::{Result, WorkbookError};
pub use format::{detect_format, DetectedFormat, InputStream, Sniffed};
pub use sources::{list_sheets, open_rows, BoxedRows, CsvRows, RowSource, SheetRows};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_module_exports() {
        let _: fn(&str) -> Result<u64> = parse_file_size;
        let _: WorkbookConfig = WorkbookConfig::default();
    }
}
