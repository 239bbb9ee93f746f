//! Run configuration.
//!
//! A [`WorkbookConfig`] is built once per validation run and never mutated
//! afterwards. It deserializes from TOML with every field optional.

use serde::{Deserialize, Serialize};

use crate::error::{Result, WorkbookError};

/// Format hint supplied by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabularFormat {
    /// Decide from file name, stream kind, or content
    #[default]
    Auto,
    /// Delimited text
    Csv,
    /// Spreadsheet archive (XLSX/XLSM)
    Xlsx,
}

impl TabularFormat {
    /// Lowercase name as used in configuration files
    pub fn as_str(self) -> &'static str {
        match self {
            TabularFormat::Auto => "auto",
            TabularFormat::Csv => "csv",
            TabularFormat::Xlsx => "xlsx",
        }
    }
}

/// Rule for mapping keys the schema does not declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraPolicy {
    /// Drop undeclared keys silently
    #[default]
    Ignore,
    /// Reject rows carrying undeclared keys
    Forbid,
    /// Pass undeclared keys through to open schemas
    Allow,
}

/// Configuration for one validation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkbookConfig {
    /// Format hint
    pub format: TabularFormat,
    /// 1-based physical row holding the header labels
    pub header_row: usize,
    /// 1-based physical row of the first data row (default: `header_row + 1`)
    pub data_row_start: Option<usize>,
    /// CSV field delimiter
    pub delimiter: char,
    /// Sheet to read; `None` selects the active sheet
    pub sheet_name: Option<String>,
    /// Extra-field policy
    pub extra: ExtraPolicy,
    /// Stop right after the first invalid row
    pub stop_on_first_error: bool,
    /// Maximum number of data rows to produce
    pub max_rows: Option<usize>,
    /// Trim surrounding whitespace from labels and text cells
    pub trim: bool,
    /// Skip data rows whose cells are all empty
    pub skip_blank_rows: bool,
    /// Reject inputs larger than this many bytes
    pub max_file_size_bytes: Option<u64>,
}

impl Default for WorkbookConfig {
    fn default() -> Self {
        Self {
            format: TabularFormat::Auto,
            header_row: 1,
            data_row_start: None,
            delimiter: ',',
            sheet_name: None,
            extra: ExtraPolicy::Ignore,
            stop_on_first_error: false,
            max_rows: None,
            trim: true,
            skip_blank_rows: true,
            max_file_size_bytes: None,
        }
    }
}

impl WorkbookConfig {
    /// Config forcing CSV input
    pub fn csv() -> Self {
        Self {
            format: TabularFormat::Csv,
            ..Default::default()
        }
    }

    /// Config forcing XLSX input
    pub fn xlsx() -> Self {
        Self {
            format: TabularFormat::Xlsx,
            ..Default::default()
        }
    }

    /// Parse a config from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(toml_str).map_err(|e| WorkbookError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// First data row, falling back to the row after the header
    pub fn data_row_start(&self) -> usize {
        self.data_row_start.unwrap_or(self.header_row.saturating_add(1))
    }

    /// Delimiter as the single byte the CSV parser expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        if self.delimiter.is_ascii() {
            Ok(self.delimiter as u8)
        } else {
            Err(WorkbookError::Config(format!(
                "delimiter must be a single ASCII character, got '{}'",
                self.delimiter
            )))
        }
    }

    /// Check all invariants
    pub fn validate(&self) -> Result<()> {
        if self.header_row < 1 {
            return Err(WorkbookError::Config("header_row must be >= 1".to_string()));
        }
        if self.data_row_start() <= self.header_row {
            return Err(WorkbookError::Config(format!(
                "data_row_start ({}) must be greater than header_row ({})",
                self.data_row_start(),
                self.header_row
            )));
        }
        self.delimiter_byte()?;
        if matches!(self.sheet_name.as_deref(), Some(name) if name.trim().is_empty()) {
            return Err(WorkbookError::Config(
                "sheet_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parse a human-readable size such as `"10MB"`, `"512 KB"` or `"1.5GB"`.
///
/// Units are binary multiples (1 KB = 1024 bytes). A bare number is bytes.
pub fn parse_file_size(size: &str) -> Result<u64> {
    let trimmed = size.trim();
    if trimmed.is_empty() {
        return Err(WorkbookError::Config("file size must not be empty".to_string()));
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (number, unit) = trimmed.split_at(split);

    let value: f64 = number
        .parse()
        .map_err(|_| WorkbookError::Config(format!("Invalid file size: '{}'", size)))?;

    let multiplier: u64 = match unit.trim().to_ascii_uppercase().as_str() {
        "" | "B" => 1,
        "K" | "KB" => 1024,
        "M" | "MB" => 1024 * 1024,
        "G" | "GB" => 1024 * 1024 * 1024,
        other => {
            return Err(WorkbookError::Config(format!(
                "Unknown file size unit '{}' in '{}'",
                other, size
            )))
        }
    };

    Ok((value * multiplier as f64).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkbookConfig::default();
        assert_eq!(config.format, TabularFormat::Auto);
        assert_eq!(config.header_row, 1);
        assert_eq!(config.data_row_start(), 2);
        assert_eq!(config.delimiter, ',');
        assert!(config.sheet_name.is_none());
        assert_eq!(config.extra, ExtraPolicy::Ignore);
        assert!(!config.stop_on_first_error);
        assert!(config.max_rows.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_data_row_start_derived_from_header() {
        let config = WorkbookConfig {
            header_row: 3,
            ..Default::default()
        };
        assert_eq!(config.data_row_start(), 4);

        let explicit = WorkbookConfig {
            header_row: 3,
            data_row_start: Some(5),
            ..Default::default()
        };
        assert_eq!(explicit.data_row_start(), 5);
    }

    #[test]
    fn test_invariants() {
        let zero_header = WorkbookConfig {
            header_row: 0,
            ..Default::default()
        };
        assert!(matches!(zero_header.validate(), Err(WorkbookError::Config(_))));

        let data_on_header = WorkbookConfig {
            header_row: 5,
            data_row_start: Some(5),
            ..Default::default()
        };
        assert!(data_on_header.validate().is_err());

        let data_before_header = WorkbookConfig {
            header_row: 5,
            data_row_start: Some(3),
            ..Default::default()
        };
        assert!(data_before_header.validate().is_err());

        let wide_delimiter = WorkbookConfig {
            delimiter: '€',
            ..Default::default()
        };
        assert!(wide_delimiter.validate().is_err());

        let zero_rows = WorkbookConfig {
            max_rows: Some(0),
            ..Default::default()
        };
        assert!(zero_rows.validate().is_ok());
    }

    #[test]
    fn test_last_possible_header_row_is_rejected() {
        let config = WorkbookConfig {
            header_row: usize::MAX,
            ..Default::default()
        };
        assert_eq!(config.data_row_start(), usize::MAX);
        assert!(matches!(config.validate(), Err(WorkbookError::Config(_))));
    }

    #[test]
    fn test_from_toml() {
        let config = WorkbookConfig::from_toml_str(
            r#"
            format = "xlsx"
            header_row = 3
            sheet_name = "Customers"
            extra = "forbid"
            max_rows = 100
            "#,
        )
        .unwrap();

        assert_eq!(config.format, TabularFormat::Xlsx);
        assert_eq!(config.data_row_start(), 4);
        assert_eq!(config.sheet_name.as_deref(), Some("Customers"));
        assert_eq!(config.extra, ExtraPolicy::Forbid);
        assert_eq!(config.max_rows, Some(100));
        assert!(config.trim);
    }

    #[test]
    fn test_from_toml_rejects_bad_values() {
        assert!(WorkbookConfig::from_toml_str("extra = \"maybe\"").is_err());
        assert!(WorkbookConfig::from_toml_str("header_row = 0").is_err());
    }

    #[test]
    fn test_parse_file_size() {
        assert_eq!(parse_file_size("512").unwrap(), 512);
        assert_eq!(parse_file_size("512B").unwrap(), 512);
        assert_eq!(parse_file_size("1KB").unwrap(), 1024);
        assert_eq!(parse_file_size("10MB").unwrap(), 10 * 1024 * 1024);
        assert_eq!(parse_file_size("10 mb").unwrap(), 10 * 1024 * 1024);
        assert_eq!(parse_file_size("1.5GB").unwrap(), 1_610_612_736);
        assert!(parse_file_size("").is_err());
        assert!(parse_file_size("ten MB").is_err());
        assert!(parse_file_size("10TB").is_err());
    }
}
