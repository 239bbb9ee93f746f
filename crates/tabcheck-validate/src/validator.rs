//! Extra-field policy around a [`Schema`].

use tabcheck_data::{ExtraPolicy, RowMap};

use crate::error::{FieldError, ValidationErrors};
use crate::schema::Schema;

/// Applies an [`ExtraPolicy`] and builds the schema's model for one row
#[derive(Debug)]
pub struct SchemaValidator<'s, S> {
    schema: &'s S,
    extra: ExtraPolicy,
}

impl<'s, S> Clone for SchemaValidator<'s, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'s, S> Copy for SchemaValidator<'s, S> {}

impl<'s, S: Schema> SchemaValidator<'s, S> {
    /// Create a validator for `schema` under `extra`
    pub fn new(schema: &'s S, extra: ExtraPolicy) -> Self {
        Self { schema, extra }
    }

    /// The wrapped schema
    pub fn schema(&self) -> &'s S {
        self.schema
    }

    /// The extra-field policy
    pub fn policy(&self) -> ExtraPolicy {
        self.extra
    }

    /// Validate one row mapping.
    ///
    /// - `ignore`: undeclared keys are dropped before building.
    /// - `forbid`: each undeclared key, blank or not, adds an
    ///   `extra_forbidden` error after the schema's own errors.
    /// - `allow`: the whole mapping goes to open schemas; closed schemas
    ///   behave as under `ignore`.
    pub fn validate(&self, row: &RowMap) -> Result<S::Model, ValidationErrors> {
        let passes_extra = self.extra == ExtraPolicy::Allow && self.schema.accepts_extra();
        if passes_extra || row.keys().all(|label| self.schema.declares(label)) {
            return self.schema.build(row);
        }

        let (declared, undeclared): (RowMap, RowMap) = row
            .iter()
            .map(|(label, value)| (label.clone(), value.clone()))
            .partition(|(label, _)| self.schema.declares(label));

        if self.extra != ExtraPolicy::Forbid {
            return self.schema.build(&declared);
        }

        let forbidden: Vec<FieldError> = undeclared
            .into_iter()
            .map(|(label, value)| FieldError::extra_forbidden(label, value))
            .collect();

        match self.schema.build(&declared) {
            Ok(model) if forbidden.is_empty() => Ok(model),
            Ok(_) => Err(forbidden.into()),
            Err(mut errors) => {
                errors.extend(forbidden.into());
                Err(errors)
            }
        }
    }
}
