//! tabcheck-validate - Per-row schema validation for tabular uploads
//!
//! This crate validates each row produced by `tabcheck-data` against a
//! caller-supplied schema and either streams the outcomes or folds them into
//! a batch result.
//!
//! # Architecture
//!
//! Schemas implement the [`Schema`] trait. A [`SchemaValidator`] applies the
//! run's extra-field policy around it, a [`RowStream`] drives it row by row,
//! and a [`ResultAggregator`] collects the outcomes. [`FieldSchema`] is a
//! declarative schema loadable from TOML; [`TypedSchema`] deserializes its
//! output into a caller struct.
//!
//! # Example
//!
//! ```
//! use tabcheck_data::{InputStream, WorkbookConfig};
//! use tabcheck_validate::{validate_workbook, FieldSchema, FieldSpec, FieldType};
//!
//! let schema = FieldSchema::new(
//!     vec![
//!         FieldSpec::new("code", FieldType::String).required(),
//!         FieldSpec::new("name", FieldType::String).required(),
//!     ],
//!     false,
//! )?;
//!
//! let input = InputStream::from_text("code,name\nA1,Alice\nA2,\n");
//! let result = validate_workbook(input, &schema, &WorkbookConfig::default(), None)?;
//!
//! assert_eq!(result.summary.total_rows, 2);
//! assert_eq!(result.summary.invalid_rows, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod aggregate;
pub mod error;
pub mod fields;
pub mod report;
pub mod schema;
pub mod stream;
pub mod typed;
pub mod validator;

// Re-exports
pub use aggregate::{
    validate_workbook, InvalidRow, ResultAggregator, WorkbookSummary, WorkbookValidationResult,
};
pub use error::{ErrorKind, FieldError, SchemaError, ValidationErrors};
pub use fields::{cell_to_json, FieldSchema, FieldSpec, FieldType};
pub use report::{
    build_error_messages, categorize, ErrorCategory, ErrorDetails, ErrorReport, ReportOptions,
    ReportStyle,
};
pub use schema::Schema;
pub use stream::{iter_validated_rows, RowResult, RowStream};
pub use typed::TypedSchema;
pub use validator::SchemaValidator;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
