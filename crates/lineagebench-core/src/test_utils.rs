//! Outcome builders shared by unit tests.

use crate::engine::annotate;
use crate::types::{DebugInfo, ParsedLineageResult, QueryOutcome, QueryTask};

/// An annotated outcome for an `INSERT` statement read from `source`.
pub fn outcome_with(
    source: &str,
    in_tables: &[&str],
    out_tables: &[&str],
    debug_error: Option<&str>,
) -> QueryOutcome {
    let result = ParsedLineageResult {
        in_tables: in_tables.iter().map(|t| t.to_string()).collect(),
        out_tables: out_tables.iter().map(|t| t.to_string()).collect(),
        debug_info: DebugInfo {
            error: debug_error.map(str::to_string),
            ..Default::default()
        },
        ..Default::default()
    };
    let task = QueryTask::new(format!("{source}:1"), "INSERT INTO b SELECT * FROM a", source);
    annotate(QueryOutcome::from_result(task, result, 1.0), None)
}

/// An annotated outcome whose parser call failed.
pub fn transport_failure(source: &str) -> QueryOutcome {
    let task = QueryTask::new(format!("{source}:1"), "INSERT INTO b VALUES (1)", source);
    annotate(
        QueryOutcome::from_transport_error(task, "connection refused", 3.0),
        None,
    )
}
