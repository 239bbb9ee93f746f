//! Declarative field schema.
//!
//! A [`FieldSchema`] is an ordered list of [`FieldSpec`]s, usually loaded from
//! TOML:
//!
//! ```toml
//! open = false
//!
//! [[field]]
//! label = "Customer Code"
//! field = "code"
//! type = "string"
//! required = true
//! pattern = "^CUST[0-9]{3}$"
//!
//! [[field]]
//! label = "Credit Limit"
//! type = "float"
//! min = 0
//! ```
//!
//! Coercion accepts both text cells (CSV) and native spreadsheet scalars,
//! so the same schema validates either format. Valid rows become a JSON
//! object keyed by each field's output name.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Number, Value};
use tabcheck_data::{CellValue, RowMap};
use tracing::debug;

use crate::error::{ErrorKind, FieldError, SchemaError, ValidationErrors};
use crate::schema::Schema;

/// Target type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Text
    #[default]
    String,
    /// 64-bit signed integer
    Integer,
    /// Finite floating point number
    Float,
    /// Boolean (`true`/`false`, `yes`/`no`, `1`/`0`, ...)
    Boolean,
    /// Calendar date, emitted as `YYYY-MM-DD`
    Date,
    /// Date and time, emitted as `YYYY-MM-DDTHH:MM:SS`
    DateTime,
}

impl FieldType {
    /// Lowercase name as written in schema files
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Float => "float",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::DateTime => "datetime",
        }
    }
}

/// One declared field
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSpec {
    /// Column label in the header row
    pub label: String,
    /// Output key; defaults to the label
    #[serde(default)]
    pub field: Option<String>,
    /// Target type
    #[serde(default, rename = "type")]
    pub kind: FieldType,
    /// Reject blank or absent values
    #[serde(default)]
    pub required: bool,
    /// Value used when an optional field is blank or absent
    #[serde(default)]
    pub default: Option<Value>,
    /// Allowed values, compared against the coerced value's text form
    #[serde(default)]
    pub choices: Vec<String>,
    /// Regular expression the value's text form must match
    #[serde(default)]
    pub pattern: Option<String>,
    /// Lower bound (numbers) or minimum length (strings)
    #[serde(default)]
    pub min: Option<f64>,
    /// Upper bound (numbers) or maximum length (strings)
    #[serde(default)]
    pub max: Option<f64>,
}

impl FieldSpec {
    /// Optional field with no constraints
    pub fn new(label: impl Into<String>, kind: FieldType) -> Self {
        Self {
            label: label.into(),
            field: None,
            kind,
            required: false,
            default: None,
            choices: Vec::new(),
            pattern: None,
            min: None,
            max: None,
        }
    }

    /// Mark the field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Emit the value under `field` instead of the label
    pub fn named(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Fallback for blank or absent optional values
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Restrict to a set of values
    pub fn choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Require a regex match
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// Lower bound
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Upper bound
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Key of this field in the produced model
    pub fn output_key(&self) -> &str {
        self.field.as_deref().unwrap_or(&self.label)
    }
}

#[derive(Debug, Clone)]
struct CompiledField {
    spec: FieldSpec,
    pattern: Option<Regex>,
}

/// Schema file layout
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SchemaFile {
    #[serde(default)]
    open: bool,
    #[serde(default, rename = "field")]
    fields: Vec<FieldSpec>,
}

/// Ordered set of declared fields producing a JSON object per row
#[derive(Debug, Clone)]
pub struct FieldSchema {
    fields: Vec<CompiledField>,
    open: bool,
}

impl FieldSchema {
    /// Compile field specs. `open` schemas pass undeclared fields through
    /// under the `allow` policy.
    pub fn new(fields: Vec<FieldSpec>, open: bool) -> Result<Self, SchemaError> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(fields.len());

        for spec in fields {
            if !seen.insert(spec.label.clone()) {
                return Err(SchemaError::DuplicateField(spec.label));
            }
            let pattern = match &spec.pattern {
                Some(pattern) => Some(Regex::new(pattern).map_err(|source| {
                    SchemaError::InvalidPattern {
                        label: spec.label.clone(),
                        source,
                    }
                })?),
                None => None,
            };
            compiled.push(CompiledField { spec, pattern });
        }

        debug!(fields = compiled.len(), open, "compiled field schema");
        Ok(Self {
            fields: compiled,
            open,
        })
    }

    /// Parse a schema from TOML (`open` flag plus `[[field]]` tables)
    pub fn from_toml_str(toml_str: &str) -> Result<Self, SchemaError> {
        let file: SchemaFile = toml::from_str(toml_str)?;
        Self::new(file.fields, file.open)
    }

    /// Declared fields, in order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().map(|f| &f.spec)
    }

    /// Check if undeclared fields are accepted
    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Schema for FieldSchema {
    type Model = Map<String, Value>;

    fn declares(&self, label: &str) -> bool {
        self.fields.iter().any(|f| f.spec.label == label)
    }

    fn accepts_extra(&self) -> bool {
        self.open
    }

    fn build(&self, row: &RowMap) -> Result<Self::Model, ValidationErrors> {
        let mut model = Map::new();
        let mut errors = ValidationErrors::new();

        for field in &self.fields {
            let spec = &field.spec;
            match row.get(spec.label.as_str()).filter(|cell| !cell.is_empty()) {
                Some(cell) => match field.check(cell) {
                    Ok(value) => {
                        model.insert(spec.output_key().to_string(), value);
                    }
                    Err(error) => errors.push(error),
                },
                None if spec.required => errors.push(FieldError::missing(&spec.label)),
                None => {
                    let value = spec.default.clone().unwrap_or(Value::Null);
                    model.insert(spec.output_key().to_string(), value);
                }
            }
        }

        if self.open {
            for (label, cell) in row {
                if !self.declares(label) {
                    model.insert(label.clone(), cell_to_json(cell));
                }
            }
        }

        errors.into_result()?;
        Ok(model)
    }
}

impl CompiledField {
    fn check(&self, cell: &CellValue) -> Result<Value, FieldError> {
        let fail = |kind: ErrorKind, message: String| {
            FieldError::new(self.spec.label.as_str(), kind, message).with_input(cell.clone())
        };

        let value = coerce(self.spec.kind, cell).map_err(|(kind, msg)| fail(kind, msg.into()))?;
        self.check_constraints(&value)
            .map_err(|msg| fail(ErrorKind::ValueError, msg))?;
        Ok(value)
    }

    fn check_constraints(&self, value: &Value) -> Result<(), String> {
        let spec = &self.spec;
        let text = match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };

        if !spec.choices.is_empty() && !spec.choices.contains(&text) {
            let allowed: Vec<String> = spec.choices.iter().map(|c| format!("'{}'", c)).collect();
            return Err(format!("Input should be one of: {}", allowed.join(", ")));
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(&text) {
                return Err(format!("String should match pattern '{}'", pattern.as_str()));
            }
        }

        match spec.kind {
            FieldType::String => {
                let length = text.chars().count() as f64;
                if let Some(min) = spec.min.filter(|min| length < *min) {
                    return Err(format!("String should have at least {} characters", min));
                }
                if let Some(max) = spec.max.filter(|max| length > *max) {
                    return Err(format!("String should have at most {} characters", max));
                }
            }
            FieldType::Integer | FieldType::Float => {
                if let Some(number) = value.as_f64() {
                    if let Some(min) = spec.min.filter(|min| number < *min) {
                        return Err(format!("Input should be greater than or equal to {}", min));
                    }
                    if let Some(max) = spec.max.filter(|max| number > *max) {
                        return Err(format!("Input should be less than or equal to {}", max));
                    }
                }
            }
            FieldType::Boolean | FieldType::Date | FieldType::DateTime => {}
        }

        Ok(())
    }
}

type CoerceResult<T> = std::result::Result<T, (ErrorKind, &'static str)>;

fn coerce(kind: FieldType, cell: &CellValue) -> CoerceResult<Value> {
    match kind {
        FieldType::String => match cell {
            CellValue::Error(_) => Err((ErrorKind::StringType, "Input should be a valid string")),
            other => Ok(Value::String(other.to_string())),
        },
        FieldType::Integer => coerce_integer(cell).map(Value::from),
        FieldType::Float => coerce_float(cell).and_then(|number| {
            Number::from_f64(number)
                .map(Value::Number)
                .ok_or((ErrorKind::FloatParsing, "Input should be a finite number"))
        }),
        FieldType::Boolean => coerce_bool(cell).map(Value::Bool),
        FieldType::Date => {
            coerce_date(cell).map(|date| Value::String(date.format("%Y-%m-%d").to_string()))
        }
        FieldType::DateTime => coerce_datetime(cell)
            .map(|dt| Value::String(dt.format("%Y-%m-%dT%H:%M:%S").to_string())),
    }
}

fn coerce_integer(cell: &CellValue) -> CoerceResult<i64> {
    match cell {
        CellValue::Int(i) => Ok(*i),
        CellValue::Float(f) => whole_number(*f),
        CellValue::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                return Ok(i);
            }
            match s.parse::<f64>() {
                Ok(f) => whole_number(f),
                Err(_) => Err((
                    ErrorKind::IntParsing,
                    "Input should be a valid integer, unable to parse string as an integer",
                )),
            }
        }
        _ => Err((ErrorKind::IntParsing, "Input should be a valid integer")),
    }
}

/// Convert a float with no fractional part that fits in an `i64`.
///
/// `i64::MAX as f64` rounds up to 2^63, so the upper bound is exclusive.
fn whole_number(f: f64) -> CoerceResult<i64> {
    if !f.is_finite() || f.fract() != 0.0 {
        return Err((
            ErrorKind::IntParsing,
            "Input should be a valid integer, got a number with a fractional part",
        ));
    }
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err((
            ErrorKind::IntParsing,
            "Input should be a valid integer, value is out of range",
        ));
    }
    Ok(f as i64)
}

fn coerce_float(cell: &CellValue) -> CoerceResult<f64> {
    match cell {
        CellValue::Int(i) => Ok(*i as f64),
        CellValue::Float(f) => Ok(*f),
        CellValue::String(s) => s.trim().parse::<f64>().map_err(|_| {
            (
                ErrorKind::FloatParsing,
                "Input should be a valid number, unable to parse string as a number",
            )
        }),
        _ => Err((ErrorKind::FloatParsing, "Input should be a valid number")),
    }
}

fn coerce_bool(cell: &CellValue) -> CoerceResult<bool> {
    const INVALID: &str = "Input should be a valid boolean";
    match cell {
        CellValue::Bool(b) => Ok(*b),
        CellValue::Int(0) => Ok(false),
        CellValue::Int(1) => Ok(true),
        CellValue::Float(f) if *f == 0.0 => Ok(false),
        CellValue::Float(f) if *f == 1.0 => Ok(true),
        CellValue::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Ok(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Ok(false),
            _ => Err((
                ErrorKind::BoolParsing,
                "Input should be a valid boolean, unable to interpret input",
            )),
        },
        _ => Err((ErrorKind::BoolParsing, INVALID)),
    }
}

fn coerce_date(cell: &CellValue) -> CoerceResult<NaiveDate> {
    const ZERO_TIME: &str = "Datetimes provided to dates should have zero time";
    match cell {
        CellValue::DateTime(dt) if dt.time() == NaiveTime::MIN => Ok(dt.date()),
        CellValue::DateTime(_) => Err((ErrorKind::DateParsing, ZERO_TIME)),
        CellValue::String(s) => {
            let s = s.trim();
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Ok(date);
            }
            match parse_datetime(s) {
                Some(dt) if dt.time() == NaiveTime::MIN => Ok(dt.date()),
                Some(_) => Err((ErrorKind::DateParsing, ZERO_TIME)),
                None => Err((
                    ErrorKind::DateParsing,
                    "Input should be a valid date in the format YYYY-MM-DD",
                )),
            }
        }
        _ => Err((ErrorKind::DateParsing, "Input should be a valid date")),
    }
}

fn coerce_datetime(cell: &CellValue) -> CoerceResult<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Ok(*dt),
        CellValue::String(s) => {
            let s = s.trim();
            parse_datetime(s)
                .or_else(|| {
                    NaiveDate::parse_from_str(s, "%Y-%m-%d")
                        .ok()
                        .map(|date| date.and_time(NaiveTime::MIN))
                })
                .ok_or((ErrorKind::DateParsing, "Input should be a valid datetime"))
        }
        _ => Err((ErrorKind::DateParsing, "Input should be a valid datetime")),
    }
}

fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// JSON form of a raw cell, used for passed-through fields
pub fn cell_to_json(cell: &CellValue) -> Value {
    match cell {
        CellValue::Empty => Value::Null,
        CellValue::String(s) | CellValue::Duration(s) => Value::String(s.clone()),
        CellValue::Int(i) => Value::from(*i),
        CellValue::Float(f) => Number::from_f64(*f).map_or(Value::Null, Value::Number),
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::DateTime(_) | CellValue::Error(_) => Value::String(cell.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(pairs: &[(&str, CellValue)]) -> RowMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::text(s, true)
    }

    fn customer_schema() -> FieldSchema {
        FieldSchema::new(
            vec![
                FieldSpec::new("code", FieldType::String).required(),
                FieldSpec::new("name", FieldType::String).required(),
                FieldSpec::new("age", FieldType::Integer),
            ],
            false,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_row() {
        let model = customer_schema()
            .build(&row(&[("code", text("A1")), ("name", text("Alice")), ("age", text("30"))]))
            .unwrap();
        assert_eq!(model["code"], "A1");
        assert_eq!(model["age"], 30);
    }

    #[test]
    fn test_collects_every_failing_field() {
        let errors = customer_schema()
            .build(&row(&[("code", text("A1")), ("name", CellValue::Empty), ("age", text("old"))]))
            .unwrap_err();

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.errors()[0].field, "name");
        assert_eq!(errors.errors()[0].kind, ErrorKind::Missing);
        assert_eq!(errors.errors()[1].field, "age");
        assert_eq!(errors.errors()[1].kind, ErrorKind::IntParsing);
        assert_eq!(errors.errors()[1].input, Some(text("old")));
    }

    #[test]
    fn test_optional_uses_default_or_null() {
        let schema = FieldSchema::new(
            vec![
                FieldSpec::new("status", FieldType::String).with_default("Active"),
                FieldSpec::new("notes", FieldType::String),
            ],
            false,
        )
        .unwrap();

        let model = schema.build(&row(&[("status", CellValue::Empty)])).unwrap();
        assert_eq!(model["status"], "Active");
        assert_eq!(model["notes"], Value::Null);
    }

    #[test]
    fn test_native_spreadsheet_values() {
        let schema = FieldSchema::new(
            vec![
                FieldSpec::new("code", FieldType::String),
                FieldSpec::new("qty", FieldType::Integer),
                FieldSpec::new("price", FieldType::Float),
                FieldSpec::new("active", FieldType::Boolean),
                FieldSpec::new("since", FieldType::Date),
            ],
            false,
        )
        .unwrap();
        let since = NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_time(NaiveTime::MIN);

        let model = schema
            .build(&row(&[
                ("code", CellValue::Float(1001.0)),
                ("qty", CellValue::Float(3.0)),
                ("price", CellValue::Float(9.5)),
                ("active", CellValue::Bool(true)),
                ("since", CellValue::DateTime(since)),
            ]))
            .unwrap();

        assert_eq!(
            Value::Object(model),
            json!({"code": "1001", "qty": 3, "price": 9.5, "active": true, "since": "2024-01-15"})
        );
    }

    #[test]
    fn test_integer_rejects_fraction() {
        let schema =
            FieldSchema::new(vec![FieldSpec::new("qty", FieldType::Integer)], false).unwrap();
        let errors = schema.build(&row(&[("qty", CellValue::Float(2.5))])).unwrap_err();
        assert!(errors.errors()[0].message.contains("fractional part"));
        assert_eq!(schema.build(&row(&[("qty", text("10.0"))])).unwrap()["qty"], 10);
    }

    #[test]
    fn test_integer_rejects_out_of_range() {
        let schema =
            FieldSchema::new(vec![FieldSpec::new("qty", FieldType::Integer)], false).unwrap();

        for input in [
            text("1e30"),
            text("99999999999999999999"),
            text("-1e19"),
            CellValue::Float(9_223_372_036_854_775_808.0),
        ] {
            let errors = schema.build(&row(&[("qty", input.clone())])).unwrap_err();
            assert_eq!(errors.errors()[0].kind, ErrorKind::IntParsing, "{:?}", input);
            assert!(errors.errors()[0].message.ends_with("out of range"));
        }

        assert_eq!(
            schema.build(&row(&[("qty", text("9223372036854775807"))])).unwrap()["qty"],
            i64::MAX
        );
        assert_eq!(
            schema.build(&row(&[("qty", CellValue::Float(-9_223_372_036_854_775_808.0))]))
                .unwrap()["qty"],
            i64::MIN
        );
    }

    #[test]
    fn test_boolean_and_date_strings() {
        let schema = FieldSchema::new(
            vec![
                FieldSpec::new("active", FieldType::Boolean),
                FieldSpec::new("at", FieldType::DateTime),
                FieldSpec::new("on", FieldType::Date),
            ],
            false,
        )
        .unwrap();

        let model = schema
            .build(&row(&[
                ("active", text("Yes")),
                ("at", text("2024-03-01 08:30:00")),
                ("on", text("2024-03-01")),
            ]))
            .unwrap();
        assert_eq!(model["active"], true);
        assert_eq!(model["at"], "2024-03-01T08:30:00");
        assert_eq!(model["on"], "2024-03-01");

        let errors = schema
            .build(&row(&[("active", text("maybe")), ("on", text("01/03/2024"))]))
            .unwrap_err();
        let kinds: Vec<ErrorKind> = errors.errors().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::BoolParsing, ErrorKind::DateParsing]);
    }

    #[test]
    fn test_constraints() {
        let schema = FieldSchema::new(
            vec![
                FieldSpec::new("code", FieldType::String).pattern("^CUST[0-9]{3}$"),
                FieldSpec::new("tier", FieldType::String).choices(["gold", "silver"]),
                FieldSpec::new("limit", FieldType::Float).min(0.0).max(1000.0),
                FieldSpec::new("name", FieldType::String).min(2.0),
            ],
            false,
        )
        .unwrap();

        assert!(schema
            .build(&row(&[
                ("code", text("CUST001")),
                ("tier", text("gold")),
                ("limit", text("250")),
                ("name", text("Al")),
            ]))
            .is_ok());

        let errors = schema
            .build(&row(&[
                ("code", text("X1")),
                ("tier", text("bronze")),
                ("limit", text("-1")),
                ("name", text("A")),
            ]))
            .unwrap_err();
        assert_eq!(errors.len(), 4);
        assert!(errors.errors().iter().all(|e| e.kind == ErrorKind::ValueError));
        assert_eq!(
            errors.errors()[1].message,
            "Input should be one of: 'gold', 'silver'"
        );
        assert_eq!(
            errors.errors()[2].message,
            "Input should be greater than or equal to 0"
        );
    }

    #[test]
    fn test_named_output_key() {
        let schema = FieldSchema::new(
            vec![FieldSpec::new("Customer Code", FieldType::String).named("code")],
            false,
        )
        .unwrap();
        let model = schema.build(&row(&[("Customer Code", text("A1"))])).unwrap();
        assert_eq!(model.get("code"), Some(&json!("A1")));
        assert!(!model.contains_key("Customer Code"));
    }

    #[test]
    fn test_open_schema_keeps_extras() {
        let schema =
            FieldSchema::new(vec![FieldSpec::new("code", FieldType::String)], true).unwrap();
        assert!(schema.accepts_extra());

        let model = schema
            .build(&row(&[("code", text("A1")), ("note", text("vip"))]))
            .unwrap();
        assert_eq!(model["note"], "vip");
    }

    #[test]
    fn test_from_toml() {
        let schema = FieldSchema::from_toml_str(
            r#"
            open = true

            [[field]]
            label = "code"
            required = true

            [[field]]
            label = "Credit Limit"
            field = "credit_limit"
            type = "float"
            min = 0
            default = 0.0
            "#,
        )
        .unwrap();

        assert!(schema.is_open());
        let specs: Vec<&FieldSpec> = schema.fields().collect();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].kind, FieldType::String);
        assert!(specs[0].required);
        assert_eq!(specs[1].output_key(), "credit_limit");
        assert_eq!(specs[1].min, Some(0.0));
    }

    #[test]
    fn test_schema_errors() {
        let duplicate = FieldSchema::new(
            vec![
                FieldSpec::new("code", FieldType::String),
                FieldSpec::new("code", FieldType::Integer),
            ],
            false,
        );
        assert!(matches!(duplicate, Err(SchemaError::DuplicateField(label)) if label == "code"));

        let bad_pattern =
            FieldSchema::new(vec![FieldSpec::new("code", FieldType::String).pattern("(")], false);
        assert!(matches!(bad_pattern, Err(SchemaError::InvalidPattern { .. })));

        let bad_type = FieldSchema::from_toml_str("[[field]]\nlabel = \"x\"\ntype = \"money\"\n");
        assert!(matches!(bad_type, Err(SchemaError::Parse(_))));
    }

    #[test]
    fn test_cell_to_json() {
        assert_eq!(cell_to_json(&CellValue::Empty), Value::Null);
        assert_eq!(cell_to_json(&CellValue::Int(4)), json!(4));
        assert_eq!(cell_to_json(&CellValue::Float(f64::NAN)), Value::Null);
        assert_eq!(cell_to_json(&CellValue::Bool(false)), json!(false));
    }
}
