//! Error types for reading tabular uploads.
//!
//! Everything here is run-fatal: once one of these is raised the run stops.
//! Per-row schema failures live in `tabcheck-validate`.

use thiserror::Error;

/// Result type for workbook operations
pub type Result<T> = std::result::Result<T, WorkbookError>;

/// Errors that abort a validation run
#[derive(Debug, Error)]
pub enum WorkbookError {
    /// Configuration violates one of its invariants
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Named sheet does not exist in the workbook
    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    /// Workbook contains no sheets at all
    #[error("Workbook has no sheets")]
    NoSheets,

    /// Archive could not be opened or a sheet could not be parsed
    #[error("Failed to open workbook: {0}")]
    Workbook(String),

    /// Delimited text could not be decoded
    #[error("CSV decode error: {0}")]
    Csv(String),

    /// Input exceeded the configured size limit
    #[error("File size exceeds maximum limit of {limit} bytes")]
    FileTooLarge {
        /// Configured limit in bytes
        limit: u64,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(std::io::Error),
}

/// Raised inside the reader stack when the byte budget runs out.
///
/// Travels through `std::io::Error` so that `csv` and `calamine` pass it
/// along untouched; converted back into [`WorkbookError::FileTooLarge`].
#[derive(Debug, Error)]
#[error("input exceeds {limit} bytes")]
pub struct SizeLimitExceeded {
    /// Configured limit in bytes
    pub limit: u64,
}

impl From<std::io::Error> for WorkbookError {
    fn from(err: std::io::Error) -> Self {
        if let Some(exceeded) = err
            .get_ref()
            .and_then(|inner| inner.downcast_ref::<SizeLimitExceeded>())
        {
            return WorkbookError::FileTooLarge {
                limit: exceeded.limit,
            };
        }
        WorkbookError::Io(err)
    }
}

impl From<csv::Error> for WorkbookError {
    fn from(err: csv::Error) -> Self {
        if err.is_io_error() {
            if let csv::ErrorKind::Io(io_err) = err.into_kind() {
                return io_err.into();
            }
            return WorkbookError::Csv("unknown IO failure".to_string());
        }
        WorkbookError::Csv(err.to_string())
    }
}

impl From<calamine::XlsxError> for WorkbookError {
    fn from(err: calamine::XlsxError) -> Self {
        WorkbookError::Workbook(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_size_limit_survives_io_wrapping() {
        let io_err = io::Error::new(io::ErrorKind::InvalidData, SizeLimitExceeded { limit: 10 });
        let err: WorkbookError = io_err.into();
        assert!(matches!(err, WorkbookError::FileTooLarge { limit: 10 }));
    }

    #[test]
    fn test_plain_io_error_stays_io() {
        let err: WorkbookError = io::Error::new(io::ErrorKind::UnexpectedEof, "eof").into();
        assert!(matches!(err, WorkbookError::Io(_)));
    }

    #[test]
    fn test_display() {
        let err = WorkbookError::SheetNotFound("Missing".to_string());
        assert_eq!(err.to_string(), "Sheet not found: Missing");
    }
}
