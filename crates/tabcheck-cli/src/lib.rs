//! tabcheck CLI - Command-line interface library
//!
//! This library provides the CLI functionality for tabcheck:
//! - Check: Validate a CSV or XLSX upload against a TOML schema
//! - Sheets: List the sheets of an XLSX workbook
//!
//! # Library Usage
//!
//! ```ignore
//! use tabcheck_cli::{check_command, OutputFormat};
//!
//! let config = WorkbookConfig::default();
//! let all_valid = check_command(
//!     &input,
//!     &schema,
//!     &config,
//!     OutputFormat::Json,
//!     &ReportOptions::default(),
//!     &mut std::io::stdout(),
//! )?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Validate an upload
//! tabcheck check customers.xlsx --schema customer.toml --sheet Customers
//!
//! # Stream one JSON line per row
//! tabcheck check customers.csv --schema customer.toml --output jsonl
//!
//! # List sheets
//! tabcheck sheets customers.xlsx
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{check_command, sheets_command};
pub use app::{run_cli, ConfigArgs, ExtraArg, FormatHint, OutputFormat};
