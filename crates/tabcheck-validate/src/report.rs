//! User-facing error reports.
//!
//! Turns a [`WorkbookValidationResult`] into display lines plus a
//! serializable [`ErrorDetails`] value for programmatic consumers.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tabcheck_data::{CellValue, RowMap};

use crate::aggregate::WorkbookValidationResult;
use crate::error::{ErrorKind, FieldError};

const FIX_HINT: &str = "Please fix the errors above and try again.";

/// Coarse grouping of error kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Value absent or blank
    MissingRequired,
    /// Value has the wrong shape for its type
    InvalidFormat,
    /// Value refers to something that does not exist
    MissingReference,
    /// Value parsed but broke a constraint
    BusinessRule,
    /// Anything else
    Other,
}

impl ErrorCategory {
    /// Snake-case name
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCategory::MissingRequired => "missing_required",
            ErrorCategory::InvalidFormat => "invalid_format",
            ErrorCategory::MissingReference => "missing_reference",
            ErrorCategory::BusinessRule => "business_rule",
            ErrorCategory::Other => "other",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of one field error
pub fn categorize(error: &FieldError) -> ErrorCategory {
    let message = error.message.to_lowercase();
    match error.kind {
        ErrorKind::Missing => ErrorCategory::MissingRequired,
        ErrorKind::StringType
        | ErrorKind::IntParsing
        | ErrorKind::FloatParsing
        | ErrorKind::DateParsing => ErrorCategory::InvalidFormat,
        _ if message.contains("does not exist") => ErrorCategory::MissingReference,
        ErrorKind::ValueError
            if ["required", "empty", "cannot be zero"]
                .iter()
                .any(|keyword| message.contains(keyword)) =>
        {
            ErrorCategory::MissingRequired
        }
        ErrorKind::ValueError => ErrorCategory::BusinessRule,
        ErrorKind::BoolParsing | ErrorKind::ExtraForbidden | ErrorKind::Other => {
            ErrorCategory::Other
        }
    }
}

/// Message layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportStyle {
    /// One line per error, capped at `max_errors` errors
    #[default]
    Flat,
    /// Summary line, then one group per row, capped at `max_errors` rows
    Structured,
}

/// Options for [`build_error_messages`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    /// Cap on errors (flat) or rows (structured) shown
    pub max_errors: usize,
    /// Message layout
    pub style: ReportStyle,
    /// Attach each invalid row's cells to [`RowErrors::raw_data`]
    pub include_raw_data: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            max_errors: 50,
            style: ReportStyle::Flat,
            include_raw_data: true,
        }
    }
}

/// One error in [`ErrorDetails`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    /// Column label
    pub field: String,
    /// Message
    pub message: String,
    /// Error kind
    pub error_type: ErrorKind,
    /// Error category
    pub category: ErrorCategory,
    /// Offending input
    pub input_value: Option<CellValue>,
}

/// Errors of one row in [`ErrorDetails`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowErrors {
    /// 1-based row index within the data region
    pub row_index: usize,
    /// Number of errors
    pub error_count: usize,
    /// The errors
    pub errors: Vec<ErrorDetail>,
    /// Cells of the row as read, unless disabled in [`ReportOptions`]
    pub raw_data: Option<RowMap>,
}

/// Counts in [`ErrorDetails`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailsSummary {
    /// Rows validated
    pub total_rows: usize,
    /// Valid rows
    pub valid_rows: usize,
    /// Invalid rows
    pub invalid_rows: usize,
    /// Field errors across all rows
    pub error_count: usize,
    /// Percentage of invalid rows
    pub error_rate: f64,
}

/// Structured error information for programmatic access
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetails {
    /// Counts
    pub summary: DetailsSummary,
    /// Errors keyed by row index
    pub errors_by_row: BTreeMap<usize, RowErrors>,
    /// Sorted indices of invalid rows
    pub invalid_row_indices: Vec<usize>,
}

/// Display lines plus structured details
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReport {
    /// Lines ready to show a user
    pub messages: Vec<String>,
    /// Structured details
    pub details: ErrorDetails,
}

/// Build a report for the invalid rows of `result`
pub fn build_error_messages<M>(
    result: &WorkbookValidationResult<M>,
    options: &ReportOptions,
) -> ErrorReport {
    let mut errors_by_row = BTreeMap::new();
    for row in &result.errors {
        let details: Vec<ErrorDetail> = row
            .errors
            .errors()
            .iter()
            .map(|error| ErrorDetail {
                field: error.field.clone(),
                message: error.message.clone(),
                error_type: error.kind,
                category: categorize(error),
                input_value: error.input.clone(),
            })
            .collect();
        if details.is_empty() {
            continue;
        }
        errors_by_row.insert(
            row.row_index,
            RowErrors {
                row_index: row.row_index,
                error_count: details.len(),
                errors: details,
                raw_data: options.include_raw_data.then(|| row.raw.clone()),
            },
        );
    }
    let error_count: usize = errors_by_row.values().map(|row| row.error_count).sum();

    let messages = match options.style {
        ReportStyle::Flat => flat_messages(&errors_by_row, error_count, options.max_errors),
        ReportStyle::Structured => {
            let mut messages = vec![
                format!(
                    "File validation failed: {} row(s) with {} error(s) out of {} total row(s).",
                    result.summary.invalid_rows, error_count, result.summary.total_rows
                ),
                String::new(),
            ];
            messages.extend(structured_messages(&errors_by_row, options.max_errors));
            messages
        }
    };

    ErrorReport {
        messages,
        details: ErrorDetails {
            summary: DetailsSummary {
                total_rows: result.summary.total_rows,
                valid_rows: result.summary.valid_rows,
                invalid_rows: result.summary.invalid_rows,
                error_count,
                error_rate: result.summary.error_rate(),
            },
            invalid_row_indices: errors_by_row.keys().copied().collect(),
            errors_by_row,
        },
    }
}

fn flat_messages(
    errors_by_row: &BTreeMap<usize, RowErrors>,
    error_count: usize,
    max_errors: usize,
) -> Vec<String> {
    let mut messages: Vec<String> = errors_by_row
        .values()
        .flat_map(|row| {
            row.errors.iter().map(move |error| {
                let prefix = format!("Row {}", row.row_index);
                match (error.field.as_str(), shown_input(error)) {
                    ("", _) => format!("{}: {}", prefix, error.message),
                    (field, Some(input)) => {
                        format!("{}, {} = '{}': {}", prefix, field, input, error.message)
                    }
                    (field, None) => format!("{}, {}: {}", prefix, field, error.message),
                }
            })
        })
        .take(max_errors)
        .collect();

    if error_count > max_errors {
        messages.push(format!(
            "... and {} more error(s). {}",
            error_count - max_errors,
            FIX_HINT
        ));
    }
    messages
}

fn structured_messages(errors_by_row: &BTreeMap<usize, RowErrors>, max_rows: usize) -> Vec<String> {
    let mut messages = Vec::new();
    for (shown, row) in errors_by_row.values().enumerate() {
        if shown >= max_rows {
            messages.push(format!(
                "... and {} more row(s) with errors. {}",
                errors_by_row.len() - shown,
                FIX_HINT
            ));
            break;
        }

        messages.push(format!("Row {} ({} error(s)):", row.row_index, row.error_count));
        for error in &row.errors {
            let line = match (error.field.as_str(), shown_input(error)) {
                ("", _) => format!("  • {}", error.message),
                (field, Some(input)) => format!("  • {} = '{}': {}", field, input, error.message),
                (field, None) => format!("  • {}: {}", field, error.message),
            };
            messages.push(line);
        }
        messages.push(String::new());
    }
    messages
}

fn shown_input(error: &ErrorDetail) -> Option<String> {
    error
        .input_value
        .as_ref()
        .map(ToString::to_string)
        .filter(|text| !text.is_empty())
}
