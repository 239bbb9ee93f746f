//! Schema capability interface.
//!
//! The validation core only asks a schema three things: which labels it
//! declares, whether it takes undeclared fields, and to build a model from a
//! label→value mapping. It never inspects the schema's structure.

use tabcheck_data::RowMap;

use crate::error::ValidationErrors;

/// Caller-supplied row schema
pub trait Schema {
    /// Model produced for a valid row
    type Model;

    /// Check if `label` is a declared field
    fn declares(&self, label: &str) -> bool;

    /// Check if undeclared fields may be passed through under `allow`
    fn accepts_extra(&self) -> bool {
        false
    }

    /// Build a model from one row mapping, reporting every failing field
    fn build(&self, row: &RowMap) -> Result<Self::Model, ValidationErrors>;
}

impl<S: Schema + ?Sized> Schema for &S {
    type Model = S::Model;

    fn declares(&self, label: &str) -> bool {
        (**self).declares(label)
    }

    fn accepts_extra(&self) -> bool {
        (**self).accepts_extra()
    }

    fn build(&self, row: &RowMap) -> Result<Self::Model, ValidationErrors> {
        (**self).build(row)
    }
}
