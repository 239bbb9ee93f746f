//! Cell values and per-row context.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Label→value mapping handed to the schema
pub type RowMap = BTreeMap<String, CellValue>;

/// A single raw cell.
///
/// CSV cells are always `Empty` or `String`; spreadsheet cells keep their
/// native type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Blank cell
    Empty,
    /// Text
    String(String),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Boolean
    Bool(bool),
    /// Date or date-time
    DateTime(NaiveDateTime),
    /// Duration in ISO 8601 text form
    Duration(String),
    /// Spreadsheet formula error such as `#DIV/0!`
    Error(String),
}

impl CellValue {
    /// Build a text cell, mapping blank text to [`CellValue::Empty`]
    pub fn text(value: impl Into<String>, trim: bool) -> Self {
        let value = value.into();
        let value = if trim {
            value.trim().to_string()
        } else {
            value
        };
        if value.is_empty() {
            CellValue::Empty
        } else {
            CellValue::String(value)
        }
    }

    /// Check if the cell is blank
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Name of the variant, for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Empty => "empty",
            CellValue::String(_) => "string",
            CellValue::Int(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Bool(_) => "boolean",
            CellValue::DateTime(_) => "datetime",
            CellValue::Duration(_) => "duration",
            CellValue::Error(_) => "error",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => f.write_str(s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => {
                // Whole floats print without the trailing ".0"
                if v.fract() == 0.0 && v.is_finite() {
                    write!(f, "{:.0}", v)
                } else {
                    write!(f, "{}", v)
                }
            }
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::DateTime(dt) => {
                if dt.time() == chrono::NaiveTime::MIN {
                    write!(f, "{}", dt.date())
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S"))
                }
            }
            CellValue::Duration(s) => f.write_str(s),
            CellValue::Error(e) => write!(f, "#ERROR: {}", e),
        }
    }
}

/// Mapping key for a cell with no header label (1-based column number)
pub fn column_key(column: usize) -> String {
    format!("__column_{}", column)
}

/// One data row as produced by a row reader
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowContext {
    /// 1-based index within the data region
    pub row_index: usize,
    /// 1-based physical row in the file or sheet
    pub source_row: usize,
    /// Header labels, in column order
    pub headers: Arc<[String]>,
    /// Cell values, in column order
    pub values: Vec<CellValue>,
    /// Label→value mapping derived from `headers` and `values`
    pub raw: RowMap,
}

impl RowContext {
    /// Pair values with headers positionally.
    ///
    /// Cells past the end of `values` are absent from the mapping. Cells
    /// without a label are keyed by [`column_key`] and only kept when
    /// non-empty.
    pub fn new(
        row_index: usize,
        source_row: usize,
        headers: Arc<[String]>,
        values: Vec<CellValue>,
    ) -> Self {
        let mut raw = RowMap::new();
        for (idx, value) in values.iter().enumerate() {
            match headers.get(idx).filter(|label| !label.is_empty()) {
                Some(label) => {
                    raw.insert(label.clone(), value.clone());
                }
                None if !value.is_empty() => {
                    raw.insert(column_key(idx + 1), value.clone());
                }
                None => {}
            }
        }

        Self {
            row_index,
            source_row,
            headers,
            values,
            raw,
        }
    }

    /// Value for a header label
    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.raw.get(label)
    }

    /// Check if every cell is blank
    pub fn is_blank(&self) -> bool {
        self.values.iter().all(CellValue::is_empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(labels: &[&str]) -> Arc<[String]> {
        labels.iter().map(|s| s.to_string()).collect()
    }

    fn text(s: &str) -> CellValue {
        CellValue::text(s, true)
    }

    #[test]
    fn test_text_normalization() {
        assert_eq!(CellValue::text("  Alice ", true), CellValue::String("Alice".into()));
        assert_eq!(CellValue::text("  Alice ", false), CellValue::String("  Alice ".into()));
        assert_eq!(CellValue::text("   ", true), CellValue::Empty);
        assert_eq!(CellValue::text("", false), CellValue::Empty);
    }

    #[test]
    fn test_display() {
        assert_eq!(CellValue::Empty.to_string(), "");
        assert_eq!(CellValue::Int(42).to_string(), "42");
        assert_eq!(CellValue::Float(3.14).to_string(), "3.14");
        assert_eq!(CellValue::Float(10.0).to_string(), "10");
        assert_eq!(CellValue::Bool(true).to_string(), "true");
    }

    #[test]
    fn test_positional_mapping() {
        let row = RowContext::new(1, 2, headers(&["code", "name"]), vec![text("A1"), text("Alice")]);
        assert_eq!(row.get("code"), Some(&text("A1")));
        assert_eq!(row.get("name"), Some(&text("Alice")));
        assert_eq!(row.raw.len(), 2);
    }

    #[test]
    fn test_short_row_leaves_missing_cells_absent() {
        let row = RowContext::new(1, 2, headers(&["code", "name", "email"]), vec![text("A1")]);
        assert_eq!(row.raw.len(), 1);
        assert!(row.get("name").is_none());
    }

    #[test]
    fn test_present_empty_cell_is_kept() {
        let row = RowContext::new(1, 2, headers(&["code", "name"]), vec![text("A2"), text("")]);
        assert_eq!(row.get("name"), Some(&CellValue::Empty));
    }

    #[test]
    fn test_extra_cells_use_positional_keys() {
        let row = RowContext::new(
            1,
            2,
            headers(&["code", "name"]),
            vec![text("A1"), text("Alice"), text("extra"), text("")],
        );
        assert_eq!(row.get(&column_key(3)), Some(&text("extra")));
        assert!(row.get(&column_key(4)).is_none());
    }

    #[test]
    fn test_empty_label_slot_preserved_positionally() {
        let row = RowContext::new(1, 2, headers(&["code", "", "name"]), vec![text("A1"), text("x"), text("Alice")]);
        assert_eq!(row.get("name"), Some(&text("Alice")));
        assert_eq!(row.get(&column_key(2)), Some(&text("x")));
    }

    #[test]
    fn test_is_blank() {
        let row = RowContext::new(1, 2, headers(&["a", "b"]), vec![CellValue::Empty, CellValue::Empty]);
        assert!(row.is_blank());
    }

    #[test]
    fn test_serializes_untagged() {
        let json = serde_json::to_string(&vec![CellValue::Empty, CellValue::Int(3), text("x")]).unwrap();
        assert_eq!(json, r#"[null,3,"x"]"#);
    }
}
