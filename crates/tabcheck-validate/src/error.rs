//! Structured per-row validation errors.
//!
//! A [`ValidationErrors`] value collects every failing field of one row.
//! These are never run-fatal; run-fatal errors are
//! [`tabcheck_data::WorkbookError`].

use std::fmt;

use serde::Serialize;
use tabcheck_data::CellValue;
use thiserror::Error;

/// Machine-readable kind of a field error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required field absent or blank
    Missing,
    /// Undeclared field under the `forbid` policy
    ExtraForbidden,
    /// Value cannot be read as text
    StringType,
    /// Value is not an integer
    IntParsing,
    /// Value is not a number
    FloatParsing,
    /// Value is not a boolean
    BoolParsing,
    /// Value is not a date or date-time
    DateParsing,
    /// Value parsed but broke a constraint
    ValueError,
    /// Anything else, e.g. a failure building a typed model
    Other,
}

impl ErrorKind {
    /// Snake-case name, stable for reports
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Missing => "missing",
            ErrorKind::ExtraForbidden => "extra_forbidden",
            ErrorKind::StringType => "string_type",
            ErrorKind::IntParsing => "int_parsing",
            ErrorKind::FloatParsing => "float_parsing",
            ErrorKind::BoolParsing => "bool_parsing",
            ErrorKind::DateParsing => "date_parsing",
            ErrorKind::ValueError => "value_error",
            ErrorKind::Other => "other",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One failing field
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Column label the error refers to (empty for whole-row errors)
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// Error kind
    pub kind: ErrorKind,
    /// Offending input, when there was one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<CellValue>,
}

impl FieldError {
    /// Create an error without an input value
    pub fn new(field: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            kind,
            input: None,
        }
    }

    /// Attach the offending input
    pub fn with_input(mut self, input: CellValue) -> Self {
        self.input = Some(input);
        self
    }

    /// Required field absent or blank
    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, ErrorKind::Missing, "Field required")
    }

    /// Undeclared field under the `forbid` policy
    pub fn extra_forbidden(field: impl Into<String>, input: CellValue) -> Self {
        Self::new(field, ErrorKind::ExtraForbidden, "Extra inputs are not permitted")
            .with_input(input)
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.field.is_empty() {
            write!(f, "{} [{}]", self.message, self.kind)
        } else {
            write!(f, "{}: {} [{}]", self.field, self.message, self.kind)
        }
    }
}

/// Every field error of one row
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a single error
    pub fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Add an error
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Append all errors from `other`
    pub fn extend(&mut self, other: ValidationErrors) {
        self.errors.extend(other.errors);
    }

    /// The collected errors, in detection order
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Check if nothing failed
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Errors for one field label
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// `Ok(())` when empty, otherwise `Err(self)`
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<Vec<FieldError>> for ValidationErrors {
    fn from(errors: Vec<FieldError>) -> Self {
        Self { errors }
    }
}

impl IntoIterator for ValidationErrors {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())?;
        for error in &self.errors {
            write!(f, "\n  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors raised while defining a schema
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Pattern is not a valid regular expression
    #[error("Invalid pattern for field '{label}': {source}")]
    InvalidPattern {
        /// Field label
        label: String,
        /// Regex compile error
        source: regex::Error,
    },

    /// Two fields share a label
    #[error("Duplicate field label: {0}")]
    DuplicateField(String),

    /// Schema file could not be parsed
    #[error("Schema parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_multiple_errors() {
        let mut errors = ValidationErrors::new();
        errors.push(FieldError::missing("name"));
        errors.push(
            FieldError::new("age", ErrorKind::IntParsing, "Input should be a valid integer")
                .with_input(CellValue::String("abc".into())),
        );

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_field("age").count(), 1);
        assert!(errors.clone().into_result().is_err());
        assert!(ValidationErrors::new().into_result().is_ok());
    }

    #[test]
    fn test_display() {
        let errors = ValidationErrors::single(FieldError::missing("name"));
        assert_eq!(
            errors.to_string(),
            "1 validation error(s)\n  name: Field required [missing]"
        );
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ErrorKind::ExtraForbidden.as_str(), "extra_forbidden");
        assert_eq!(
            serde_json::to_string(&ErrorKind::DateParsing).unwrap(),
            "\"date_parsing\""
        );
    }

    #[test]
    fn test_serialize_transparent() {
        let errors = ValidationErrors::single(FieldError::extra_forbidden(
            "note",
            CellValue::String("x".into()),
        ));
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json[0]["kind"], "extra_forbidden");
        assert_eq!(json[0]["input"], "x");
    }
}
