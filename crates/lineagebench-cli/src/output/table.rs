//! Human-readable terminal output.

use lineagebench_core::{AggregateSummary, Flag, QueryOutcome};
use owo_colors::OwoColorize;
use std::fmt::Write;
use std::path::Path;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Renders one statement's block.
///
/// `raw_output` is the artifact path, shown so the block can be traced to
/// its JSON file. The uncolored form is also what gets persisted.
pub fn render_query_outcome(
    index: usize,
    total: usize,
    outcome: &QueryOutcome,
    raw_output: Option<&Path>,
    colored: bool,
) -> String {
    let status = if outcome.rpc_error.is_some() {
        "RPC_ERROR"
    } else if outcome.parser_error.is_some() {
        "PARSE_ERROR"
    } else {
        "OK"
    };
    let header = format!(
        "[{status}] Query {index}/{total}: {}",
        outcome.task.identifier
    );
    let flags = if outcome.flags.is_empty() {
        "[]".to_string()
    } else {
        outcome.flags.prefix()
    };

    let mut out = String::new();
    writeln!(out).unwrap();
    if colored {
        let painted = match status {
            "OK" => header.green().bold().to_string(),
            _ => header.red().bold().to_string(),
        };
        writeln!(out, "{painted}").unwrap();
        writeln!(out, "{}", "-".repeat(header.len()).dimmed()).unwrap();
    } else {
        writeln!(out, "{header}").unwrap();
        writeln!(out, "{}", "-".repeat(header.len())).unwrap();
    }

    writeln!(out, "Source: {}", outcome.task.context).unwrap();
    if colored && outcome.has_flag(Flag::Err) {
        writeln!(out, "Flags: {}", flags.red()).unwrap();
    } else {
        writeln!(out, "Flags: {flags}").unwrap();
    }
    writeln!(
        out,
        "Statement type: {} ({})",
        outcome.statement_type, outcome.statement_type_source
    )
    .unwrap();
    writeln!(out, "Parse time: {:.3} ms", outcome.timing_ms).unwrap();
    writeln!(
        out,
        "Self-referential lineage: {}",
        if outcome.self_referential { "YES" } else { "NO" }
    )
    .unwrap();
    if let Some(error) = &outcome.rpc_error {
        writeln!(out, "RPC error: {error}").unwrap();
    }
    if let Some(error) = &outcome.parser_error {
        writeln!(out, "Parser error: {error}").unwrap();
    }

    writeln!(out, "Query preview:").unwrap();
    for line in outcome.task.preview_lines() {
        writeln!(out, "{line}").unwrap();
    }

    writeln!(out, "Lineage summary:").unwrap();
    if outcome.upstreams.is_empty() && outcome.downstreams.is_empty() {
        writeln!(out, "  (no upstream or downstream datasets detected)").unwrap();
    } else {
        write_datasets(&mut out, "Downstreams", &outcome.downstreams);
        write_datasets(&mut out, "Upstreams", &outcome.upstreams);
    }
    write_datasets(&mut out, "Column lineage", &outcome.column_edges);

    let raw = raw_output
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<not written>".to_string());
    write!(out, "Raw parser output: {raw}").unwrap();
    out
}

fn write_datasets(out: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    writeln!(out, "  {title}:").unwrap();
    for item in items {
        writeln!(out, "    - {item}").unwrap();
    }
}

const TOP_ERROR_TYPES: usize = 5;

/// The run-wide headline counts.
pub fn format_overview(summary: &AggregateSummary, raw_dir: Option<&Path>) -> String {
    let overview = &summary.overview;
    let mut out = String::new();
    writeln!(out, "\n=== Summary ===").unwrap();
    writeln!(out, "Total queries: {}", overview.query_count).unwrap();
    writeln!(out, "Successful parses: {}", overview.success_count).unwrap();
    writeln!(out, "Parser errors: {}", overview.parser_error_count).unwrap();
    writeln!(out, "RPC errors: {}", overview.rpc_error_count).unwrap();
    writeln!(out, "Queries flagged with ERR: {}", overview.error_count).unwrap();
    writeln!(out, "Queries with lineage: {}", overview.lineage_count).unwrap();
    writeln!(
        out,
        "Queries missing lineage (GAP): {}",
        overview.gap_lineage_count
    )
    .unwrap();
    writeln!(
        out,
        "Self-referential lineage: {}",
        overview.self_referential_count
    )
    .unwrap();
    writeln!(
        out,
        "Queries with column lineage (COL): {}",
        overview.column_lineage_count
    )
    .unwrap();
    writeln!(out, "Total parser time (ms): {:.3}", overview.timing_ms_total).unwrap();

    let errors = &summary.errors;
    if errors.error_count > 0 {
        writeln!(out, "Errors encountered: {}", errors.error_count).unwrap();
        for entry in errors.by_type.iter().take(TOP_ERROR_TYPES) {
            writeln!(out, "  {}: {}", entry.error_type, entry.count).unwrap();
        }
    }

    let validation = &summary.validation;
    if validation.validated_count > 0 {
        writeln!(
            out,
            "Validation: {}/{} passed ({:.1}%)",
            validation.passed,
            validation.validated_count,
            validation.pass_rate * 100.0
        )
        .unwrap();
    }
    if let Some(dir) = raw_dir {
        writeln!(out, "Raw outputs stored in: {}", dir.display()).unwrap();
    }
    out
}

#[derive(Tabled)]
struct StatementTypeRow {
    #[tabled(rename = "Statement Type")]
    statement_type: String,
    #[tabled(rename = "Queries")]
    queries: usize,
    #[tabled(rename = "Success")]
    success: usize,
    #[tabled(rename = "Errors")]
    errors: usize,
    #[tabled(rename = "Success %")]
    success_rate: String,
    #[tabled(rename = "Avg ms")]
    avg_ms: String,
    #[tabled(rename = "P95 ms")]
    p95_ms: String,
}

/// Statement-type table, largest types first.
pub fn format_statement_types(summary: &AggregateSummary) -> String {
    let mut rows: Vec<StatementTypeRow> = summary
        .statement_type_summary
        .iter()
        .map(|(statement_type, metrics)| StatementTypeRow {
            statement_type: statement_type.clone(),
            queries: metrics.total_queries,
            success: metrics.success_count,
            errors: metrics.error_count,
            success_rate: format!("{:.1}%", metrics.success_rate),
            avg_ms: format!("{:.2}", metrics.timing_ms.avg),
            p95_ms: format!("{:.2}", metrics.timing_ms.p95),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.queries
            .cmp(&a.queries)
            .then_with(|| a.statement_type.cmp(&b.statement_type))
    });

    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::modern()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineagebench_core::{
        annotate, summarize, ColumnLineageEdge, ColumnRef, ParsedLineageResult, QueryTask,
    };

    fn lineage_outcome() -> QueryOutcome {
        let task = QueryTask::new("etl/load.sql:1", "INSERT INTO b\nSELECT id FROM a", "etl/load.sql")
            .with_context("etl/load.sql (statement 1)");
        let result = ParsedLineageResult {
            in_tables: vec!["a".into()],
            out_tables: vec!["b".into()],
            column_lineage: vec![ColumnLineageEdge::new(
                ColumnRef::new("b", "id"),
                vec![ColumnRef::new("a", "id")],
            )],
            ..Default::default()
        };
        annotate(QueryOutcome::from_result(task, result, 1.5), None)
    }

    #[test]
    fn test_render_successful_outcome() {
        let output = render_query_outcome(
            1,
            2,
            &lineage_outcome(),
            Some(Path::new("out/[LIN][COL]x.json")),
            false,
        );
        let expected = "
[OK] Query 1/2: etl/load.sql:1
------------------------------
Source: etl/load.sql (statement 1)
Flags: [LIN][COL]
Statement type: INSERT (fallback)
Parse time: 1.500 ms
Self-referential lineage: NO
Query preview:
etl/load.sql ::
    INSERT INTO b
    SELECT id FROM a
Lineage summary:
  Downstreams:
    - b
  Upstreams:
    - a
  Column lineage:
    - a.id -> b.id
Raw parser output: out/[LIN][COL]x.json";
        assert_eq!(output, expected);
    }

    #[test]
    fn test_render_transport_failure() {
        let task = QueryTask::new("q.sql:1", "SELECT 1", "q.sql");
        let outcome = annotate(
            QueryOutcome::from_transport_error(task, "connection refused", 0.0),
            None,
        );
        let output = render_query_outcome(1, 1, &outcome, None, false);
        assert!(output.contains("[RPC_ERROR] Query 1/1: q.sql:1"));
        assert!(output.contains("Flags: [ERR]"));
        assert!(output.contains("RPC error: connection refused"));
        assert!(output.contains("(no upstream or downstream datasets detected)"));
        assert!(output.ends_with("Raw parser output: <not written>"));
    }

    #[test]
    fn test_overview_lists_top_error_types() {
        let outcomes: Vec<QueryOutcome> = (0..7)
            .map(|n| {
                let task = QueryTask::new(format!("q.sql:{n}"), "SELECT 1", "q.sql");
                annotate(
                    QueryOutcome::from_transport_error(task, format!("Kind{}: boom", n % 6), 0.0),
                    None,
                )
            })
            .collect();
        let overview = format_overview(&summarize("run", &outcomes), None);

        assert!(overview.contains("Errors encountered: 7\n  Kind0: 2\n  Kind1: 1\n"));
        assert!(overview.contains("  Kind4: 1\n"));
        assert!(!overview.contains("Kind5"));
    }

    #[test]
    fn test_overview_and_statement_table() {
        let outcomes = vec![lineage_outcome()];
        let summary = summarize("run", &outcomes);

        let overview = format_overview(&summary, Some(Path::new("lineage_outputs/run")));
        assert!(overview.contains("Total queries: 1"));
        assert!(overview.contains("Queries with column lineage (COL): 1"));
        assert!(overview.contains("Total parser time (ms): 1.500"));
        assert!(overview.ends_with("Raw outputs stored in: lineage_outputs/run\n"));

        let table = format_statement_types(&summary);
        assert!(table.contains("Statement Type"));
        assert!(table.contains("INSERT"));
        assert!(table.contains("100.0%"));
    }
}
