//! lineagebench CLI - SQL lineage parser harness

use lineagebench_cli::cli;
use lineagebench_cli::expected;
use lineagebench_cli::input;
use lineagebench_cli::output;

use anyhow::{bail, Context, Result};
use clap::Parser;
use is_terminal::IsTerminal;
use lineagebench_cli::HttpLineageParser;
use lineagebench_core::{
    evaluate_batch_with, EngineError, Expectations, Flag, QueryOutcome, ValidationStatus,
};
use lineagebench_export::{export_report_json, report_schema_json, run_dir_name};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Args, OutputFormat};

/// A statement errored or failed validation under --strict.
const EXIT_FAILURE: u8 = 1;
/// Configuration error (no inputs, unreadable inputs, empty batch).
const EXIT_CONFIG_ERROR: u8 = 66;

const DEFAULT_OUTPUT_ROOT: &str = "lineage_outputs";

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    if args.report_schema {
        return match report_schema_json() {
            Ok(schema) => match write_stdout(&schema) {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    eprintln!("lineagebench: error: {e:#}");
                    ExitCode::from(EXIT_FAILURE)
                }
            },
            Err(e) => {
                eprintln!("lineagebench: error: {e:#}");
                ExitCode::from(EXIT_FAILURE)
            }
        };
    }

    match run(args) {
        Ok(gate_failed) => {
            if gate_failed {
                ExitCode::from(EXIT_FAILURE)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            eprintln!("lineagebench: error: {e:#}");
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Runs the whole batch. Returns `true` when the `--strict` gate failed.
fn run(args: Args) -> Result<bool> {
    if !args.has_inputs() {
        bail!("Provide at least one --sql-file/--sql-dir/--csv-spec/--csv-dir input");
    }

    let tasks = input::collect_tasks(&args).context("Failed to load SQL inputs")?;
    let expectations = match &args.expected_dir {
        Some(dir) => {
            if !dir.is_dir() {
                bail!("Expected results directory not found: {}", dir.display());
            }
            expected::load_expectations(dir, &tasks)
        }
        None => Expectations::new(),
    };
    info!(
        statements = tasks.len(),
        expected = expectations.len(),
        "collected inputs"
    );

    let run_dir = args.output_dir.clone().unwrap_or_else(default_run_dir);
    let config = args.run_config();
    let parser = HttpLineageParser::new(&args.client_config())
        .context("Failed to create lineage parser client")?;
    info!(endpoint = parser.endpoint(), "sending statements to lineage parser");

    let show_progress = !args.quiet && args.format == OutputFormat::Table;
    let mut progress = ProgressBar::new(tasks.len(), !show_progress);
    let outcomes = match evaluate_batch_with(&parser, &config, tasks, &expectations, |_, _, _| {
        progress.tick()
    }) {
        Ok(outcomes) => outcomes,
        Err(EngineError::EmptyBatch) => bail!("No SQL statements found in the provided inputs"),
    };
    progress.finish();

    let plans = output::plan_sources(&run_dir, &outcomes);
    let paths = output::artifact_paths(&plans);
    let colored = std::io::stdout().is_terminal();
    let total = outcomes.len();

    let mut terminal_outputs = HashMap::with_capacity(total);
    let mut stdout = io::stdout().lock();
    for (offset, outcome) in outcomes.iter().enumerate() {
        let raw_path = paths.get(&outcome.task.identifier).map(PathBuf::as_path);
        let plain = output::render_query_outcome(offset + 1, total, outcome, raw_path, false);
        if show_progress {
            let display = if colored {
                output::render_query_outcome(offset + 1, total, outcome, raw_path, true)
            } else {
                plain.clone()
            };
            writeln!(stdout, "{display}").context("Failed to write to stdout")?;
        }
        terminal_outputs.insert(outcome.task.identifier.clone(), plain);
    }
    drop(stdout);

    for plan in &plans {
        output::write_source_artifacts(plan, &terminal_outputs)?;
    }
    let report = output::write_run_report(&run_dir, &outcomes)?;

    let dialect = config.dialect.as_deref();
    if let Some(path) = &args.output_csv {
        output::write_results_csv(path, &outcomes, dialect)?;
    }
    if let Some(path) = &args.output_json {
        output::write_results_json(path, &outcomes, dialect, args.compact)?;
    }

    match args.format {
        OutputFormat::Table => {
            let mut summary = output::format_overview(&report.summary, Some(&run_dir));
            if !args.quiet {
                summary.push('\n');
                summary.push_str(&output::format_statement_types(&report.summary));
            }
            write_stdout(&summary)?;
        }
        OutputFormat::Json => write_stdout(&export_report_json(&report, args.compact)?)?,
    }

    Ok(args.strict && gate_failed(&outcomes))
}

fn gate_failed(outcomes: &[QueryOutcome]) -> bool {
    outcomes.iter().any(|outcome| {
        outcome.has_flag(Flag::Err) || outcome.validation_status == ValidationStatus::Failed
    })
}

fn default_run_dir() -> PathBuf {
    Path::new(DEFAULT_OUTPUT_ROOT).join(run_dir_name(&chrono::Local::now()))
}

fn write_stdout(content: &str) -> Result<()> {
    let mut stdout = io::stdout();
    stdout
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    // Ensure newline at end for terminal output
    if !content.ends_with('\n') {
        writeln!(stdout).context("Failed to write to stdout")?;
    }
    Ok(())
}

struct ProgressBar {
    enabled: bool,
    total: usize,
    current: usize,
}

impl ProgressBar {
    const WIDTH: usize = 30;

    fn new(total: usize, quiet: bool) -> Self {
        let enabled = !quiet && total > 0 && io::stderr().is_terminal();
        let progress = Self {
            enabled,
            total,
            current: 0,
        };

        if progress.enabled {
            progress.render();
        }

        progress
    }

    fn tick(&mut self) {
        if !self.enabled {
            return;
        }

        self.current = self.current.saturating_add(1).min(self.total);
        self.render();
    }

    fn finish(&self) {
        if self.enabled {
            eprintln!();
        }
    }

    fn render(&self) {
        let filled = if self.total == 0 {
            0
        } else {
            self.current * Self::WIDTH / self.total
        };
        let empty = Self::WIDTH - filled;

        eprint!(
            "\rParsing [{:=>filled$}{:empty$}] {}/{}",
            "", "", self.current, self.total
        );
        let _ = io::stderr().flush();
    }
}
