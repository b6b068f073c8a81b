//! Report rendering for lineagebench runs.
//!
//! Turns evaluated outcomes into the structured `[[]]report.json`, the
//! narrative `[[]]report.md`, per-statement artifacts and flat CSV/JSON
//! result tables. Everything here is pure formatting; callers decide where
//! the bytes go.

mod csv;
mod error;
mod json;
mod markdown;
mod naming;
mod report;
mod results;

pub use csv::export_results_csv;
pub use error::ExportError;
pub use json::{export_artifact_json, export_report_json, export_results_json};
pub use markdown::{
    clean_markdown_cell, format_count_pairs, format_markdown_table, render_report_markdown,
};
pub use naming::{
    query_filename, run_dir_name, sanitize_component, short_digest, source_folder_name,
    REPORT_JSON_NAME, REPORT_MARKDOWN_NAME,
};
pub use report::{
    build_source_report, report_schema, report_schema_json, QueryEntry, SourceReport,
    StatementArtifact,
};
pub use results::{build_result_records, ResultRecord};
