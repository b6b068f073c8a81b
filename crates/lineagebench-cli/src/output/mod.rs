//! Output formatting and artifact writing.

pub mod artifacts;
pub mod table;

pub use artifacts::{
    artifact_paths, plan_sources, write_results_csv, write_results_json, write_run_report,
    write_source_artifacts, SourceArtifacts,
};
pub use table::{format_overview, format_statement_types, render_query_outcome};
