//! Structured per-source and run-wide reports.

use lineagebench_core::{
    summarize, AggregateSummary, FlagSet, QueryOutcome, StatementTypeSource,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::naming::query_filename;

/// One statement in a report's query index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QueryEntry {
    pub identifier: String,
    pub flags: FlagSet,
    /// File name of the statement artifact, relative to the source folder
    pub raw_output_file: Option<String>,
    pub succeeded: bool,
    pub timing_ms: f64,
    pub preview: Vec<String>,
    pub statement_type: String,
    pub statement_type_source: StatementTypeSource,
    pub parser_statement_type: Option<String>,
}

impl QueryEntry {
    pub fn from_outcome(outcome: &QueryOutcome) -> Self {
        Self {
            identifier: outcome.task.identifier.clone(),
            flags: outcome.flags.clone(),
            raw_output_file: Some(query_filename(outcome)),
            succeeded: outcome.succeeded(),
            timing_ms: outcome.timing_ms,
            preview: outcome.task.preview_lines(),
            statement_type: outcome.statement_type.clone(),
            statement_type_source: outcome.statement_type_source,
            parser_statement_type: outcome.parser_statement_type.clone(),
        }
    }
}

/// The `[[]]report.json` document: the aggregate plus a per-query index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceReport {
    #[serde(flatten)]
    pub summary: AggregateSummary,
    pub queries: Vec<QueryEntry>,
}

/// Builds the report for `source` over `outcomes` in their input order.
pub fn build_source_report<O>(source: impl Into<String>, outcomes: &[O]) -> SourceReport
where
    O: std::borrow::Borrow<QueryOutcome>,
{
    SourceReport {
        summary: summarize(source, outcomes),
        queries: outcomes
            .iter()
            .map(|outcome| QueryEntry::from_outcome(outcome.borrow()))
            .collect(),
    }
}

/// Per-statement artifact written next to the source report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementArtifact {
    pub flags: FlagSet,
    pub terminal_output: String,
    pub raw_payload: Value,
    pub source_query: String,
    pub preview: Vec<String>,
}

impl StatementArtifact {
    pub fn new(outcome: &QueryOutcome, terminal_output: impl Into<String>) -> Self {
        Self {
            flags: outcome.flags.clone(),
            terminal_output: terminal_output.into(),
            raw_payload: outcome.raw_payload(),
            source_query: outcome.task.query_text.clone(),
            preview: outcome.task.preview_lines(),
        }
    }
}

/// JSON Schema (draft-07) of [`SourceReport`].
pub fn report_schema() -> schemars::Schema {
    schemars::generate::SchemaSettings::draft07()
        .into_generator()
        .into_root_schema_for::<SourceReport>()
}

/// Pretty-printed report schema.
pub fn report_schema_json() -> Result<String, crate::ExportError> {
    Ok(serde_json::to_string_pretty(&report_schema())?)
}
