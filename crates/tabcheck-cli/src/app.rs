//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tabcheck_data::{
    list_sheets, parse_file_size, ExtraPolicy, InputStream, TabularFormat, WorkbookConfig,
};
use tabcheck_validate::{
    build_error_messages, iter_validated_rows, FieldSchema, ReportOptions, ReportStyle,
    ResultAggregator, RowResult,
};

/// Output format for check results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// One JSON report after all rows
    Json,
    /// One JSON line per row as it is validated, then a summary line
    Jsonl,
}

/// Format hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatHint {
    /// Decide from file name or content
    Auto,
    /// Delimited text
    Csv,
    /// Spreadsheet archive
    Xlsx,
}

impl From<FormatHint> for TabularFormat {
    fn from(hint: FormatHint) -> Self {
        match hint {
            FormatHint::Auto => TabularFormat::Auto,
            FormatHint::Csv => TabularFormat::Csv,
            FormatHint::Xlsx => TabularFormat::Xlsx,
        }
    }
}

/// Extra-field policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExtraArg {
    /// Drop undeclared columns
    Ignore,
    /// Reject rows with undeclared columns
    Forbid,
    /// Keep undeclared columns for open schemas
    Allow,
}

impl From<ExtraArg> for ExtraPolicy {
    fn from(arg: ExtraArg) -> Self {
        match arg {
            ExtraArg::Ignore => ExtraPolicy::Ignore,
            ExtraArg::Forbid => ExtraPolicy::Forbid,
            ExtraArg::Allow => ExtraPolicy::Allow,
        }
    }
}

/// Run configuration flags; each one overrides the config file
#[derive(Debug, Clone, Default, Args)]
pub struct ConfigArgs {
    /// Run configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Input format
    #[arg(long, value_enum)]
    pub format_hint: Option<FormatHint>,

    /// 1-based row holding the header labels
    #[arg(long)]
    pub header_row: Option<usize>,

    /// 1-based row of the first data row
    #[arg(long)]
    pub data_row_start: Option<usize>,

    /// CSV delimiter
    #[arg(long)]
    pub delimiter: Option<char>,

    /// Sheet to read (default: the active sheet)
    #[arg(long)]
    pub sheet: Option<String>,

    /// Policy for columns the schema does not declare
    #[arg(long, value_enum)]
    pub extra: Option<ExtraArg>,

    /// Stop right after the first invalid row
    #[arg(long)]
    pub stop_on_first_error: bool,

    /// Validate at most this many rows
    #[arg(long)]
    pub max_rows: Option<usize>,

    /// Reject inputs larger than this (e.g. 10MB)
    #[arg(long)]
    pub max_file_size: Option<String>,
}

impl ConfigArgs {
    /// Build the run configuration: file (or discovered file) then flags
    pub fn load(&self) -> Result<WorkbookConfig> {
        let mut config = load_config(self.config.as_deref())?;

        if let Some(hint) = self.format_hint {
            config.format = hint.into();
        }
        if let Some(header_row) = self.header_row {
            config.header_row = header_row;
        }
        if let Some(start) = self.data_row_start {
            config.data_row_start = Some(start);
        }
        if let Some(delimiter) = self.delimiter {
            config.delimiter = delimiter;
        }
        if let Some(sheet) = &self.sheet {
            config.sheet_name = Some(sheet.clone());
        }
        if let Some(extra) = self.extra {
            config.extra = extra.into();
        }
        if self.stop_on_first_error {
            config.stop_on_first_error = true;
        }
        if let Some(max_rows) = self.max_rows {
            config.max_rows = Some(max_rows);
        }
        if let Some(size) = &self.max_file_size {
            let bytes = parse_file_size(size)
                .with_context(|| format!("Invalid --max-file-size: {}", size))?;
            config.max_file_size_bytes = Some(bytes);
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[derive(Parser)]
#[command(name = "tabcheck")]
#[command(author, version, about = "Preflight validation for CSV and XLSX uploads", long_about = None)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence per target)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate every row of a CSV or XLSX file against a schema
    Check {
        /// Input file
        input: PathBuf,

        /// Schema file (TOML)
        #[arg(short, long)]
        schema: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,

        /// Output format (text, json, or jsonl)
        #[arg(short, long, value_enum, default_value = "text")]
        output: OutputFormat,

        /// Maximum errors (or rows, with --structured) listed
        #[arg(long, default_value_t = 50)]
        max_errors: usize,

        /// Group errors by row under a summary line
        #[arg(long)]
        structured: bool,

        /// Leave row cells out of the JSON report details
        #[arg(long)]
        no_raw_data: bool,
    },

    /// List the sheets of an XLSX workbook
    Sheets {
        /// Input XLSX file
        input: PathBuf,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Check {
            input,
            schema,
            config,
            output,
            max_errors,
            structured,
            no_raw_data,
        } => {
            let config = config.load()?;
            let report = ReportOptions {
                max_errors,
                style: if structured {
                    ReportStyle::Structured
                } else {
                    ReportStyle::Flat
                },
                include_raw_data: !no_raw_data,
            };
            let all_valid = check_command(&input, &schema, &config, output, &report, &mut out)?;

            // Exit with error code if any row is invalid
            if !all_valid {
                out.flush()?;
                std::process::exit(1);
            }
        }
        Commands::Sheets { input } => {
            sheets_command(&input, &mut out)?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();
}

/// Execute the check command
///
/// Returns `Ok(true)` when every validated row is valid. Run-fatal problems
/// (unreadable file, bad schema, decode failures) are errors.
pub fn check_command(
    input: &Path,
    schema_path: &Path,
    config: &WorkbookConfig,
    output: OutputFormat,
    report: &ReportOptions,
    out: &mut impl Write,
) -> Result<bool> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let schema = load_schema(schema_path)?;

    let file =
        File::open(input).with_context(|| format!("Failed to open input: {}", input.display()))?;
    let file_name = input.file_name().and_then(|name| name.to_str());
    let stream = iter_validated_rows(
        InputStream::Bytes(BufReader::new(file)),
        &schema,
        config,
        file_name,
    )
    .with_context(|| format!("Failed to read {}", input.display()))?;
    debug!(format = ?stream.format(), columns = stream.headers().len(), "validating rows");

    let mut aggregator = ResultAggregator::new();
    for row in stream {
        let row = row.with_context(|| format!("Failed to read {}", input.display()))?;
        if output == OutputFormat::Jsonl {
            writeln!(out, "{}", row_json(&row))?;
        }
        aggregator.push(row);
    }
    let result = aggregator.finish();
    let summary = result.summary;

    match output {
        OutputFormat::Text => {
            if result.is_valid() {
                writeln!(
                    out,
                    "✓ All {} row(s) valid in {}",
                    summary.total_rows,
                    input.display()
                )?;
            } else {
                let report = build_error_messages(&result, report);
                for line in &report.messages {
                    writeln!(out, "{}", line)?;
                }
                writeln!(out)?;
                writeln!(
                    out,
                    "Checked {} row(s): {} valid, {} invalid ({:.1}% error rate)",
                    summary.total_rows,
                    summary.valid_rows,
                    summary.invalid_rows,
                    summary.error_rate()
                )?;
            }
        }
        OutputFormat::Json => {
            let report = build_error_messages(&result, report);
            let json = serde_json::to_string_pretty(&json!({
                "file": input.display().to_string(),
                "valid": result.is_valid(),
                "messages": report.messages,
                "details": report.details,
            }))
            .context("Failed to serialize report to JSON")?;
            writeln!(out, "{}", json)?;
        }
        OutputFormat::Jsonl => {
            writeln!(out, "{}", json!({ "summary": summary }))?;
        }
    }

    Ok(result.is_valid())
}

/// Execute the sheets command
pub fn sheets_command(input: &Path, out: &mut impl Write) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    let file =
        File::open(input).with_context(|| format!("Failed to open input: {}", input.display()))?;
    let names = list_sheets(BufReader::new(file))
        .with_context(|| format!("Failed to read workbook: {}", input.display()))?;

    for name in names {
        writeln!(out, "{}", name)?;
    }
    Ok(())
}

fn row_json(row: &RowResult<serde_json::Map<String, serde_json::Value>>) -> serde_json::Value {
    let context = row.context();
    match row {
        RowResult::Valid { model, .. } => json!({
            "row": context.row_index,
            "source_row": context.source_row,
            "valid": true,
            "model": model,
        }),
        RowResult::Invalid { errors, .. } => json!({
            "row": context.row_index,
            "source_row": context.source_row,
            "valid": false,
            "errors": errors,
        }),
    }
}

fn load_schema(path: &Path) -> Result<FieldSchema> {
    if !path.exists() {
        anyhow::bail!("Schema file not found: {}", path.display());
    }
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;
    FieldSchema::from_toml_str(&content)
        .with_context(|| format!("Failed to parse schema: {}", path.display()))
}

fn load_config(config_path: Option<&Path>) -> Result<WorkbookConfig> {
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config: {}", path.display()))?;
            WorkbookConfig::from_toml_str(&content)
                .with_context(|| format!("Failed to parse config: {}", path.display()))
        }
        None => {
            // Try to find tabcheck.toml in the working directory
            for candidate in ["tabcheck.toml", ".tabcheck.toml"] {
                let path = Path::new(candidate);
                if path.exists() {
                    debug!(config = candidate, "using discovered config");
                    let content = fs::read_to_string(path)?;
                    return WorkbookConfig::from_toml_str(&content)
                        .with_context(|| format!("Failed to parse config: {}", candidate));
                }
            }
            Ok(WorkbookConfig::default())
        }
    }
}
