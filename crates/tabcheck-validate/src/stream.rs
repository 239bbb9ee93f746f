//! Lazy validated row stream.

use std::io::BufRead;

use tabcheck_data::{
    open_rows, BoxedRows, DetectedFormat, InputStream, Result, RowContext, WorkbookConfig,
};
use tracing::{debug, trace, warn};

use crate::error::ValidationErrors;
use crate::schema::Schema;
use crate::validator::SchemaValidator;

/// Outcome for one data row
#[derive(Debug, Clone, PartialEq)]
pub enum RowResult<M> {
    /// The schema built a model
    Valid {
        /// Source row
        context: RowContext,
        /// Built model
        model: M,
    },
    /// The schema rejected the row
    Invalid {
        /// Source row
        context: RowContext,
        /// Every failing field
        errors: ValidationErrors,
    },
}

impl<M> RowResult<M> {
    /// Check if the row passed validation
    pub fn is_valid(&self) -> bool {
        matches!(self, RowResult::Valid { .. })
    }

    /// The source row
    pub fn context(&self) -> &RowContext {
        match self {
            RowResult::Valid { context, .. } | RowResult::Invalid { context, .. } => context,
        }
    }

    /// 1-based index within the data region
    pub fn row_index(&self) -> usize {
        self.context().row_index
    }

    /// The model, for valid rows
    pub fn model(&self) -> Option<&M> {
        match self {
            RowResult::Valid { model, .. } => Some(model),
            RowResult::Invalid { .. } => None,
        }
    }

    /// The errors, for invalid rows
    pub fn errors(&self) -> Option<&ValidationErrors> {
        match self {
            RowResult::Valid { .. } => None,
            RowResult::Invalid { errors, .. } => Some(errors),
        }
    }
}

/// Pull-based iterator of validated rows.
///
/// Each call to `next` reads and validates exactly one row. The stream ends
/// after `max_rows` rows, right after the first invalid row when
/// `stop_on_first_error` is set, or after yielding a run-fatal error.
pub struct RowStream<'a, S: Schema> {
    rows: BoxedRows<'a>,
    validator: SchemaValidator<'a, S>,
    max_rows: Option<usize>,
    stop_on_first_error: bool,
    yielded: usize,
    finished: bool,
}

impl<'a, S: Schema> RowStream<'a, S> {
    /// Validate rows from an opened reader
    pub fn new(rows: BoxedRows<'a>, schema: &'a S, config: &WorkbookConfig) -> Self {
        Self {
            rows,
            validator: SchemaValidator::new(schema, config.extra),
            max_rows: config.max_rows,
            stop_on_first_error: config.stop_on_first_error,
            yielded: 0,
            finished: false,
        }
    }

    /// Header labels of the underlying reader
    pub fn headers(&self) -> &[String] {
        self.rows.headers()
    }

    /// Format of the underlying reader
    pub fn format(&self) -> DetectedFormat {
        self.rows.format()
    }

    /// Rows yielded so far
    pub fn rows_yielded(&self) -> usize {
        self.yielded
    }
}

impl<'a, S: Schema> Iterator for RowStream<'a, S> {
    type Item = Result<RowResult<S::Model>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        if self.max_rows.is_some_and(|max| self.yielded >= max) {
            debug!(max_rows = self.yielded, "row limit reached");
            self.finished = true;
            return None;
        }

        let context = match self.rows.next() {
            Some(Ok(context)) => context,
            Some(Err(err)) => {
                self.finished = true;
                return Some(Err(err));
            }
            None => {
                self.finished = true;
                return None;
            }
        };
        self.yielded += 1;

        let result = match self.validator.validate(&context.raw) {
            Ok(model) => {
                trace!(row = context.row_index, "row valid");
                RowResult::Valid { context, model }
            }
            Err(errors) => {
                trace!(row = context.row_index, errors = errors.len(), "row invalid");
                if self.stop_on_first_error {
                    warn!(row = context.row_index, "stopping at first invalid row");
                    self.finished = true;
                }
                RowResult::Invalid { context, errors }
            }
        };
        Some(Ok(result))
    }
}

/// Open `input` and validate its rows lazily.
///
/// Errors found while opening (configuration, format detection, archive,
/// sheet selection, header row) are returned here; later I/O or decode
/// errors are yielded by the stream as its last element.
pub fn iter_validated_rows<'a, R, S>(
    input: InputStream<R>,
    schema: &'a S,
    config: &WorkbookConfig,
    file_name: Option<&str>,
) -> Result<RowStream<'a, S>>
where
    R: BufRead + 'a,
    S: Schema,
{
    let rows = open_rows(input, config, file_name)?;
    Ok(RowStream::new(rows, schema, config))
}
