use std::path::Path;

use lineagebench_core::{
    annotate, validate, ColumnLineageEdge, ColumnRef, ExpectedLineage, ParsedLineageResult,
    QueryOutcome, QueryTask,
};
use lineagebench_export::{
    build_result_records, build_source_report, export_report_json, export_results_csv,
    export_results_json, render_report_markdown, source_folder_name, SourceReport,
};

fn insert_outcome() -> QueryOutcome {
    let task = QueryTask::new("etl/load.sql:1", "INSERT INTO b SELECT * FROM a", "etl/load.sql");
    let result = ParsedLineageResult {
        in_tables: vec!["a".into()],
        out_tables: vec!["b".into()],
        ..Default::default()
    };
    annotate(QueryOutcome::from_result(task, result, 2.0), None)
}

fn failed_outcome() -> QueryOutcome {
    let task = QueryTask::new("etl/load.sql:2", "DELETE FROM b", "etl/load.sql")
        .with_statement_index(2);
    annotate(
        QueryOutcome::from_transport_error(task, "connection refused", 4.0),
        None,
    )
}

fn sample() -> Vec<QueryOutcome> {
    vec![insert_outcome(), failed_outcome()]
}

#[test]
fn renders_source_markdown_report() {
    let outcomes = sample();
    let report = build_source_report("etl/load.sql", &outcomes);
    let markdown = render_report_markdown(Path::new("etl/load.sql"), &report.summary);

    insta::assert_snapshot!(markdown, @r"
# Lineage Report — load.sql

* Source path: `etl/load.sql`
* Folder flags: [ERR][LIN]
* Queries analyzed: 2
* Total parser time: 6.000 ms
* Statement types via parser: 0
* Statement types via fallback: 2

### Legend

- `Parser` vs `Fallback`: whether the parser supplied the statement type or the regex fallback classifier did.
- Flags: `ERR`=parser/RPC error, `GAP`=missing upstream or downstream lineage, `LIN`=complete table lineage, `SELF`=self-referential lineage, `COL`=column-level lineage detected.

## Statement Type Overview

_How many statements of each type we parsed, whether they succeeded, and how long they took._

| Statement Type | Queries | Success | Errors | Success % | Avg ms | P95 ms |
| --- | --- | --- | --- | --- | --- | --- |
| DELETE | 1 | 0 | 1 | 0.0% | 4.00 | 4.00 |
| INSERT | 1 | 1 | 0 | 100.0% | 2.00 | 2.00 |

## Parser Classification

_Breakdown of how each statement type was classified: parser-provided vs fallback vs still unknown, plus the raw parser labels returned._

| Statement Type | Parser | Fallback | Unresolved | Parser reported |
| --- | --- | --- | --- | --- |
| DELETE | 0 | 1 | 0 | UNAVAILABLE (1) |
| INSERT | 0 | 1 | 0 | UNAVAILABLE (1) |

## Flag Distribution by Statement Type

_This highlights quality signals per statement type. Use it to spot types that systematically have errors, missing lineage, or column-level coverage._

| Statement Type | ERR | LIN |
| --- | --- | --- |
| DELETE | 1 | 0 |
| INSERT | 0 | 1 |

## Error Class Distribution by Statement Type

_Summaries of the parser's `debugInfoError` messages. These usually explain why lineage was incomplete for a statement type._

| Statement Type | Error Class | Count |
| --- | --- | --- |
| DELETE | <none> | 1 |
| INSERT | <none> | 1 |

## Parser Error Breakdown

_The exact parser error strings returned. Use this to trace concrete failures back to the source SQL._

| Statement Type | Parser Error | Count |
| --- | --- | --- |
| DELETE | <none> | 1 |
| INSERT | <none> | 1 |
");
}

#[test]
fn report_json_round_trips() {
    let outcomes = sample();
    let report = build_source_report("etl/load.sql", &outcomes);

    let pretty = export_report_json(&report, false).expect("json export");
    assert!(pretty.contains('\n'));
    let compact = export_report_json(&report, true).expect("json export");
    assert!(!compact.contains('\n'));

    let parsed: SourceReport = serde_json::from_str(&compact).expect("parse report");
    assert_eq!(parsed, report);
    assert_eq!(parsed.summary.overview.rpc_error_count, 1);
}

#[test]
fn results_csv_has_one_row_per_statement() {
    let mut outcomes = sample();
    let expected = ExpectedLineage {
        in_tables: vec!["a".into(), "c".into()],
        out_tables: vec!["b".into()],
        column_lineage: vec![ColumnLineageEdge::new(
            ColumnRef::new("b", "id"),
            vec![ColumnRef::new("a", "id")],
        )],
    };
    let first = outcomes.remove(0);
    let validation = validate(first.result.as_ref().unwrap(), &expected);
    outcomes.insert(0, annotate(first, Some(&expected)));
    assert_eq!(outcomes[0].validation.as_ref(), Some(&validation));

    let records = build_result_records(&outcomes, Some("teradata"));
    let bytes = export_results_csv(&records).expect("csv export");
    let text = String::from_utf8(bytes).expect("utf8");
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("query_id,query_file,statement_index,statement_type,dialect"));
    assert!(lines[0].ends_with("tables_precision,tables_recall,columns_precision,columns_recall"));
    assert!(lines[1].starts_with("etl/load.sql:1,etl/load.sql,1,INSERT,teradata,true,0.0000,2.000,1,1,0,,false"));
    assert!(lines[1].ends_with("failed,1.0000,0.6667,0.0000,0.0000"));
    assert!(lines[2].starts_with("etl/load.sql:2,etl/load.sql,2,DELETE,teradata,false"));
    assert!(lines[2].contains("connection refused"));
    assert!(lines[2].ends_with("no_expected,0.0000,0.0000,0.0000,0.0000"));
}

#[test]
fn results_json_keeps_nested_complexity() {
    let records = build_result_records(&sample(), None);
    let json = export_results_json(&records, false).expect("json export");
    let value: serde_json::Value = serde_json::from_str(&json).expect("parse");

    assert_eq!(value[0]["query_id"], "etl/load.sql:1");
    assert_eq!(value[0]["dialect"], "");
    assert_eq!(value[0]["complexity"]["line_count"], 1);
    assert_eq!(value[1]["validation_status"], "no_expected");
    assert!(value[1]["validation_details"].is_null());
}

#[test]
fn folder_names_are_stable() {
    let report = build_source_report("etl/load.sql", &sample());
    let first = source_folder_name(Path::new("etl/load.sql"), &report.summary.flags);
    let second = source_folder_name(Path::new("etl/load.sql"), &report.summary.flags);
    assert_eq!(first, second);
    assert!(first.starts_with("[ERR][LIN]load.sql--"));
}
