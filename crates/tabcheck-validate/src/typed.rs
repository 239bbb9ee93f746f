//! Typed models on top of [`FieldSchema`].

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tabcheck_data::RowMap;

use crate::error::{ErrorKind, FieldError, ValidationErrors};
use crate::fields::FieldSchema;
use crate::schema::Schema;

/// Coerces a row with a [`FieldSchema`], then deserializes the resulting
/// object into `T`.
///
/// Field output keys must line up with `T`'s serde field names.
pub struct TypedSchema<T> {
    fields: FieldSchema,
    _model: PhantomData<fn() -> T>,
}

impl<T> TypedSchema<T> {
    /// Wrap a field schema
    pub fn new(fields: FieldSchema) -> Self {
        Self {
            fields,
            _model: PhantomData,
        }
    }

    /// The underlying field schema
    pub fn fields(&self) -> &FieldSchema {
        &self.fields
    }
}

impl<T> fmt::Debug for TypedSchema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedSchema")
            .field("fields", &self.fields)
            .field("model", &std::any::type_name::<T>())
            .finish()
    }
}

impl<T: DeserializeOwned> Schema for TypedSchema<T> {
    type Model = T;

    fn declares(&self, label: &str) -> bool {
        self.fields.declares(label)
    }

    fn accepts_extra(&self) -> bool {
        self.fields.accepts_extra()
    }

    fn build(&self, row: &RowMap) -> Result<T, ValidationErrors> {
        let object = self.fields.build(row)?;
        serde_json::from_value(Value::Object(object)).map_err(|err| {
            ValidationErrors::single(FieldError::new("", ErrorKind::Other, err.to_string()))
        })
    }
}
