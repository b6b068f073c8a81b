//! Artifact writing.
//!
//! Layout of a run directory:
//!
//! ```text
//! <run_dir>/
//!   [[]]report.json
//!   [[]]report.md
//!   [ERR][LIN]load.sql--1a2b3c/
//!     [[]]report.json
//!     [[]]report.md
//!     [LIN]queries_load.sql_1--4d5e6f.json
//! ```

use anyhow::{Context, Result};
use lineagebench_core::{aggregate_flags, group_by_source, QueryOutcome};
use lineagebench_export::{
    build_result_records, build_source_report, export_artifact_json, export_report_json,
    export_results_csv, export_results_json, query_filename, render_report_markdown,
    source_folder_name, SourceReport, StatementArtifact, REPORT_JSON_NAME, REPORT_MARKDOWN_NAME,
};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One source's outcomes and the folder they are written to.
#[derive(Debug)]
pub struct SourceArtifacts<'a> {
    pub source: &'a Path,
    pub folder: PathBuf,
    pub outcomes: Vec<&'a QueryOutcome>,
}

impl SourceArtifacts<'_> {
    pub fn artifact_path(&self, outcome: &QueryOutcome) -> PathBuf {
        self.folder.join(query_filename(outcome))
    }
}

/// Groups outcomes by source (first-seen order) and names each folder after
/// the group's aggregated flags.
pub fn plan_sources<'a>(run_dir: &Path, outcomes: &'a [QueryOutcome]) -> Vec<SourceArtifacts<'a>> {
    group_by_source(outcomes)
        .into_iter()
        .map(|(source, group)| {
            let flags = aggregate_flags(group.iter().map(|outcome| &outcome.flags));
            SourceArtifacts {
                source,
                folder: run_dir.join(source_folder_name(source, &flags)),
                outcomes: group,
            }
        })
        .collect()
}

/// Artifact path of every outcome, keyed by identifier.
pub fn artifact_paths(plans: &[SourceArtifacts<'_>]) -> HashMap<String, PathBuf> {
    plans
        .iter()
        .flat_map(|plan| {
            plan.outcomes
                .iter()
                .map(move |outcome| (outcome.task.identifier.clone(), plan.artifact_path(outcome)))
        })
        .collect()
}

/// Writes the per-statement artifacts and the source reports of one folder.
///
/// `terminal_outputs` holds the uncolored terminal block of each outcome,
/// keyed by identifier.
pub fn write_source_artifacts(
    plan: &SourceArtifacts<'_>,
    terminal_outputs: &HashMap<String, String>,
) -> Result<()> {
    fs::create_dir_all(&plan.folder)
        .with_context(|| format!("Failed to create {}", plan.folder.display()))?;

    for outcome in &plan.outcomes {
        let terminal_output = terminal_outputs
            .get(&outcome.task.identifier)
            .cloned()
            .unwrap_or_default();
        let artifact = StatementArtifact::new(outcome, terminal_output);
        write_file(&plan.artifact_path(outcome), &export_artifact_json(&artifact)?)?;
    }

    let report = build_source_report(plan.source.display().to_string(), &plan.outcomes);
    write_reports(&plan.folder, plan.source, &report)?;
    debug!(folder = %plan.folder.display(), statements = plan.outcomes.len(), "wrote source artifacts");
    Ok(())
}

/// Writes the run-wide reports into `run_dir` and returns the report.
pub fn write_run_report(run_dir: &Path, outcomes: &[QueryOutcome]) -> Result<SourceReport> {
    fs::create_dir_all(run_dir)
        .with_context(|| format!("Failed to create {}", run_dir.display()))?;
    let report = build_source_report(run_dir.display().to_string(), outcomes);
    write_reports(run_dir, run_dir, &report)?;
    Ok(report)
}

fn write_reports(folder: &Path, source: &Path, report: &SourceReport) -> Result<()> {
    write_file(
        &folder.join(REPORT_JSON_NAME),
        &export_report_json(report, false)?,
    )?;
    write_file(
        &folder.join(REPORT_MARKDOWN_NAME),
        &render_report_markdown(source, &report.summary),
    )
}

/// Writes the flat per-statement results as CSV.
pub fn write_results_csv(path: &Path, outcomes: &[QueryOutcome], dialect: Option<&str>) -> Result<()> {
    let bytes = export_results_csv(&build_result_records(outcomes, dialect))?;
    fs::write(path, bytes).with_context(|| format!("Failed to write {}", path.display()))
}

/// Writes the flat per-statement results as JSON.
pub fn write_results_json(
    path: &Path,
    outcomes: &[QueryOutcome],
    dialect: Option<&str>,
    compact: bool,
) -> Result<()> {
    let json = export_results_json(&build_result_records(outcomes, dialect), compact)?;
    write_file(path, &json)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
