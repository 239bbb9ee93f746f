//! Integration tests for tabcheck CLI
//!
//! These tests run the check and sheets commands against files written to a
//! temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use tabcheck_cli::{check_command, sheets_command, OutputFormat};
use tabcheck_data::test_utils::XlsxBuilder;
use tabcheck_data::{ExtraPolicy, WorkbookConfig};
use tabcheck_validate::{ReportOptions, ReportStyle};
use tempfile::TempDir;

const SCHEMA: &str = r#"
[[field]]
label = "code"
required = true
pattern = "^CUST[0-9]{3}$"

[[field]]
label = "name"
required = true

[[field]]
label = "credit_limit"
type = "float"
min = 0
"#;

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::write(dir.path().join("schema.toml"), SCHEMA).expect("Failed to write schema");
        Self { dir }
    }

    fn write(&self, name: &str, content: impl AsRef<[u8]>) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, content).expect("Failed to write input");
        path
    }

    fn schema(&self) -> PathBuf {
        self.dir.path().join("schema.toml")
    }

    fn check(&self, input: &Path, config: &WorkbookConfig, output: OutputFormat) -> (bool, String) {
        let mut out = Vec::new();
        let valid = check_command(
            input,
            &self.schema(),
            config,
            output,
            &ReportOptions::default(),
            &mut out,
        )
        .expect("check should run");
        (valid, String::from_utf8(out).expect("output should be UTF-8"))
    }
}

#[test]
fn test_check_valid_csv() {
    let fixture = Fixture::new();
    let input = fixture.write(
        "customers.csv",
        "code,name,credit_limit\nCUST001,Alice,1000\nCUST002,Bob,\n",
    );

    let (valid, output) = fixture.check(&input, &WorkbookConfig::default(), OutputFormat::Text);
    assert!(valid);
    assert!(output.starts_with("✓ All 2 row(s) valid"));
}

#[test]
fn test_check_reports_invalid_rows() {
    let fixture = Fixture::new();
    let input = fixture.write(
        "customers.csv",
        "code,name,credit_limit\nCUST001,Alice,1000\nX9,,-5\n",
    );

    let (valid, output) = fixture.check(&input, &WorkbookConfig::default(), OutputFormat::Text);
    assert!(!valid);
    assert!(output.contains("Row 2, code = 'X9': String should match pattern '^CUST[0-9]{3}$'"));
    assert!(output.contains("Row 2, name: Field required"));
    assert!(output.contains("Row 2, credit_limit = '-5': Input should be greater than or equal to 0"));
    assert!(output.contains("Checked 2 row(s): 1 valid, 1 invalid (50.0% error rate)"));
}

#[test]
fn test_check_xlsx_json_report() {
    let fixture = Fixture::new();
    let bytes = XlsxBuilder::new()
        .sheet("Summary", &[&["generated"]])
        .sheet(
            "Customers",
            &[
                &["code", "name", "credit_limit"],
                &["CUST001", "Alice", "10"],
                &["CUST002", "", "20"],
            ],
        )
        .build();
    let input = fixture.write("customers.xlsx", bytes);
    let config = WorkbookConfig {
        sheet_name: Some("Customers".into()),
        ..Default::default()
    };

    let (valid, output) = fixture.check(&input, &config, OutputFormat::Json);
    assert!(!valid);

    let json: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(json["valid"], false);
    assert_eq!(json["details"]["summary"]["total_rows"], 2);
    assert_eq!(json["details"]["invalid_row_indices"][0], 2);
    assert_eq!(json["messages"][0], "Row 2, name: Field required");
    assert_eq!(json["details"]["errors_by_row"]["2"]["raw_data"]["code"], "CUST002");
}

#[test]
fn test_check_jsonl_streams_rows() {
    let fixture = Fixture::new();
    let input = fixture.write("upload.csv", "code,name,notes\nCUST001,Alice,vip\nCUST002,Bob\n");
    let config = WorkbookConfig {
        extra: ExtraPolicy::Forbid,
        ..Default::default()
    };

    let (valid, output) = fixture.check(&input, &config, OutputFormat::Jsonl);
    assert!(!valid);

    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["row"], 1);
    assert_eq!(lines[0]["valid"], false);
    assert_eq!(lines[0]["errors"][0]["kind"], "extra_forbidden");
    assert_eq!(lines[1]["valid"], true);
    assert_eq!(lines[1]["model"]["code"], "CUST002");
    assert_eq!(lines[2]["summary"]["invalid_rows"], 1);
}

#[test]
fn test_check_structured_style() {
    let fixture = Fixture::new();
    let input = fixture.write("upload.csv", "code,name\nCUST001,\n");
    let mut out = Vec::new();
    let options = ReportOptions {
        style: ReportStyle::Structured,
        ..Default::default()
    };

    check_command(
        &input,
        &fixture.schema(),
        &WorkbookConfig::default(),
        OutputFormat::Text,
        &options,
        &mut out,
    )
    .unwrap();
    let output = String::from_utf8(out).unwrap();
    assert!(output.starts_with(
        "File validation failed: 1 row(s) with 1 error(s) out of 1 total row(s)."
    ));
    assert!(output.contains("Row 1 (1 error(s)):\n  • name: Field required"));
}

#[test]
fn test_check_missing_input() {
    let fixture = Fixture::new();
    let missing = fixture.dir.path().join("nope.csv");
    let mut out = Vec::new();
    let err = check_command(
        &missing,
        &fixture.schema(),
        &WorkbookConfig::default(),
        OutputFormat::Text,
        &ReportOptions::default(),
        &mut out,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Input file not found"));
}

#[test]
fn test_check_oversized_file_is_fatal() {
    let fixture = Fixture::new();
    let input = fixture.write("upload.csv", "code,name\nCUST001,Alice\n");
    let config = WorkbookConfig {
        max_file_size_bytes: Some(8),
        ..Default::default()
    };

    let mut out = Vec::new();
    let result = check_command(
        &input,
        &fixture.schema(),
        &config,
        OutputFormat::Text,
        &ReportOptions::default(),
        &mut out,
    );
    assert!(result.is_err());
}

#[test]
fn test_sheets_lists_workbook_order() {
    let fixture = Fixture::new();
    let bytes = XlsxBuilder::new()
        .sheet("Customers", &[&["code"]])
        .sheet("Orders", &[&["id"]])
        .build();
    let input = fixture.write("book.xlsx", bytes);

    let mut out = Vec::new();
    sheets_command(&input, &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap(), "Customers\nOrders\n");
}
