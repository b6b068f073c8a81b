//! CLI argument parsing using clap.

use clap::{Parser, ValueEnum};
use lineagebench_core::RunConfig;
use std::path::PathBuf;
use std::time::Duration;

use crate::client::{ClientConfig, DEFAULT_PARSE_PATH};

/// lineagebench - drive a SQL lineage parser over many statements and score the results
#[derive(Parser, Debug)]
#[command(name = "lineagebench")]
#[command(
    about = "Bulk-parse SQL through a lineage parser service and report per-source quality signals",
    long_about = None
)]
#[command(version)]
pub struct Args {
    /// Path to a .sql file; a directory is searched recursively for .sql files (repeatable)
    #[arg(long = "sql-file", value_name = "PATH")]
    pub sql_files: Vec<PathBuf>,

    /// Directory to search recursively for .sql files (repeatable)
    #[arg(long = "sql-dir", value_name = "DIR")]
    pub sql_dirs: Vec<PathBuf>,

    /// CSV file and the column holding SQL text, e.g. reports.csv:query (repeatable)
    #[arg(long = "csv-spec", value_name = "PATH:COLUMN")]
    pub csv_specs: Vec<String>,

    /// Directory searched recursively for .csv files (requires --csv-dir-column)
    #[arg(long = "csv-dir", value_name = "DIR", requires = "csv_dir_column")]
    pub csv_dirs: Vec<PathBuf>,

    /// Column holding SQL text in every file found via --csv-dir
    #[arg(long, value_name = "COLUMN")]
    pub csv_dir_column: Option<String>,

    /// Delimiter used when reading CSV files
    #[arg(long, default_value_t = ',')]
    pub csv_delimiter: char,

    /// Lineage parser service endpoint
    #[arg(long, env = "DATAHUB_SERVER", default_value = "http://localhost:8080")]
    pub server: String,

    /// Bearer token for the parser service
    #[arg(long, env = "DATAHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Dataset platform passed to the parser
    #[arg(long, env = "DATAHUB_PLATFORM", default_value = "teradata")]
    pub platform: String,

    /// Dataset environment passed to the parser
    #[arg(long, env = "DATAHUB_ENV", default_value = "PROD")]
    pub env: String,

    /// Default database used to qualify table names
    #[arg(long, value_name = "DB")]
    pub default_db: Option<String>,

    /// Default schema used to qualify table names
    #[arg(long, value_name = "SCHEMA")]
    pub default_schema: Option<String>,

    /// SQL dialect hint for the parser and the statement splitter
    #[arg(long, default_value = "teradata")]
    pub dialect: String,

    /// Request path of the parse endpoint
    #[arg(long, default_value = DEFAULT_PARSE_PATH)]
    pub parse_path: String,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Directory of expected lineage files, one <stem>.json per SQL file
    #[arg(long, value_name = "DIR")]
    pub expected_dir: Option<PathBuf>,

    /// Artifact directory (defaults to lineage_outputs/<YYYYmmdd_HHMMSS>)
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write per-statement results as CSV
    #[arg(long, value_name = "FILE")]
    pub output_csv: Option<PathBuf>,

    /// Write per-statement results as JSON
    #[arg(long, value_name = "FILE")]
    pub output_json: Option<PathBuf>,

    /// Output format for stdout
    #[arg(short, long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Compact JSON output (no pretty-printing)
    #[arg(short, long)]
    pub compact: bool,

    /// Print only the run summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Exit with status 1 when any statement errored or failed validation
    #[arg(long)]
    pub strict: bool,

    /// Print the JSON schema of the report document and exit
    #[arg(long)]
    pub report_schema: bool,

    /// Log progress at info level (overridden by RUST_LOG)
    #[arg(short, long)]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Per-statement blocks and a summary table
    Table,
    /// Run-wide report document
    Json,
}

impl Args {
    /// True when at least one input source was supplied.
    pub fn has_inputs(&self) -> bool {
        !(self.sql_files.is_empty()
            && self.sql_dirs.is_empty()
            && self.csv_specs.is_empty()
            && self.csv_dirs.is_empty())
    }

    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            platform: self.platform.clone(),
            env: self.env.clone(),
            dialect: Some(self.dialect.clone()).filter(|dialect| !dialect.is_empty()),
            default_db: self.default_db.clone(),
            default_schema: self.default_schema.clone(),
        }
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            server: self.server.clone(),
            parse_path: self.parse_path.clone(),
            token: self.token.clone().filter(|token| !token.is_empty()),
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}
