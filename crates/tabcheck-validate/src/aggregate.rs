//! Batch aggregation of a row stream.

use std::io::BufRead;

use serde::Serialize;
use tabcheck_data::{InputStream, Result, RowMap, WorkbookConfig};
use tracing::info;

use crate::error::ValidationErrors;
use crate::schema::Schema;
use crate::stream::{iter_validated_rows, RowResult};

/// Row counts for a validation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WorkbookSummary {
    /// Rows validated
    pub total_rows: usize,
    /// Rows that built a model
    pub valid_rows: usize,
    /// Rows the schema rejected
    pub invalid_rows: usize,
}

impl WorkbookSummary {
    /// Percentage of invalid rows, 0 when no rows were validated
    pub fn error_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            self.invalid_rows as f64 / self.total_rows as f64 * 100.0
        }
    }

    fn record(&mut self, valid: bool) {
        self.total_rows += 1;
        if valid {
            self.valid_rows += 1;
        } else {
            self.invalid_rows += 1;
        }
    }
}

/// A rejected row, kept with the cells it was built from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidRow {
    /// 1-based row index within the data region
    pub row_index: usize,
    /// Why the row was rejected
    pub errors: ValidationErrors,
    /// Label→value mapping as read
    pub raw: RowMap,
}

/// Complete outcome of a batch run
#[derive(Debug, Clone, PartialEq)]
pub struct WorkbookValidationResult<M> {
    /// Row counts
    pub summary: WorkbookSummary,
    /// Models of valid rows, in row order
    pub valid: Vec<M>,
    /// Invalid rows, in row order
    pub errors: Vec<InvalidRow>,
}

impl<M> WorkbookValidationResult<M> {
    /// Check if every row passed
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Indices of invalid rows
    pub fn invalid_row_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.errors.iter().map(|row| row.row_index)
    }

    /// Total field errors across all invalid rows
    pub fn error_count(&self) -> usize {
        self.errors.iter().map(|row| row.errors.len()).sum()
    }
}

/// Folds row results into a [`WorkbookValidationResult`]
#[derive(Debug, Clone)]
pub struct ResultAggregator<M> {
    summary: WorkbookSummary,
    valid: Vec<M>,
    errors: Vec<InvalidRow>,
}

impl<M> Default for ResultAggregator<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ResultAggregator<M> {
    /// Create an empty aggregator
    pub fn new() -> Self {
        Self {
            summary: WorkbookSummary::default(),
            valid: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Record one row outcome
    pub fn push(&mut self, result: RowResult<M>) {
        self.summary.record(result.is_valid());
        match result {
            RowResult::Valid { model, .. } => self.valid.push(model),
            RowResult::Invalid { context, errors } => self.errors.push(InvalidRow {
                row_index: context.row_index,
                errors,
                raw: context.raw,
            }),
        }
    }

    /// Counts so far
    pub fn summary(&self) -> WorkbookSummary {
        self.summary
    }

    /// Finish aggregation
    pub fn finish(self) -> WorkbookValidationResult<M> {
        WorkbookValidationResult {
            summary: self.summary,
            valid: self.valid,
            errors: self.errors,
        }
    }

    /// Drain a row stream. The first run-fatal error is returned instead of
    /// a partial result.
    pub fn from_rows<I>(rows: I) -> Result<WorkbookValidationResult<M>>
    where
        I: IntoIterator<Item = Result<RowResult<M>>>,
    {
        let mut aggregator = Self::new();
        for row in rows {
            aggregator.push(row?);
        }
        Ok(aggregator.finish())
    }
}

/// Validate every row of `input` and collect the outcome
pub fn validate_workbook<'a, R, S>(
    input: InputStream<R>,
    schema: &'a S,
    config: &WorkbookConfig,
    file_name: Option<&str>,
) -> Result<WorkbookValidationResult<S::Model>>
where
    R: BufRead + 'a,
    S: Schema,
{
    let stream = iter_validated_rows(input, schema, config, file_name)?;
    let result = ResultAggregator::from_rows(stream)?;

    info!(
        total = result.summary.total_rows,
        valid = result.summary.valid_rows,
        invalid = result.summary.invalid_rows,
        "workbook validated"
    );
    Ok(result)
}
