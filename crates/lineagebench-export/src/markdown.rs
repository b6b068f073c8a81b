//! Narrative markdown report.
//!
//! Every table lists statement types by `(-total_queries, type)`; count
//! pairs inside a cell are ordered by `(-count, key)`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::OnceLock;

use lineagebench_core::{AggregateSummary, StatementTypeMetrics, StatementTypeSource};
use regex::Regex;

const EMPTY_CELL: &str = "—";
const NO_DATA: &str = "(no data)";

fn ansi_escape_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("Invalid regex pattern"))
}

/// Makes arbitrary text safe for a single markdown table cell.
pub fn clean_markdown_cell(value: &str) -> String {
    let stripped = ansi_escape_regex().replace_all(value, "");
    let normalized = stripped.replace("\r\n", "\n").replace('\r', "\n");
    let text = normalized.trim();
    if text.is_empty() {
        return EMPTY_CELL.to_string();
    }
    text.replace('\n', "<br>").replace('|', "\\|")
}

/// Formats a markdown table, or `(no data)` when there are no rows.
pub fn format_markdown_table<H, R, C>(headers: &[H], rows: &[R]) -> Vec<String>
where
    H: AsRef<str>,
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    if rows.is_empty() {
        return vec![NO_DATA.to_string()];
    }
    let header_cells: Vec<String> = headers
        .iter()
        .map(|header| clean_markdown_cell(header.as_ref()))
        .collect();
    let separator = vec!["---"; headers.len()];

    let mut lines = vec![
        format!("| {} |", header_cells.join(" | ")),
        format!("| {} |", separator.join(" | ")),
    ];
    for row in rows {
        let cells: Vec<String> = row
            .as_ref()
            .iter()
            .map(|cell| clean_markdown_cell(cell.as_ref()))
            .collect();
        lines.push(format!("| {} |", cells.join(" | ")));
    }
    lines
}

/// `key (count), ...` ordered by `(-count, key)`; `—` when empty.
pub fn format_count_pairs(counts: &BTreeMap<String, usize>) -> String {
    if counts.is_empty() {
        return EMPTY_CELL.to_string();
    }
    ranked(counts)
        .into_iter()
        .map(|(key, count)| format!("{key} ({count})"))
        .collect::<Vec<_>>()
        .join(", ")
}

fn ranked(counts: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut items: Vec<(&str, usize)> = counts
        .iter()
        .map(|(key, count)| (key.as_str(), *count))
        .collect();
    items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    items
}

fn ordered_types(summary: &AggregateSummary) -> Vec<(&str, &StatementTypeMetrics)> {
    let mut types: Vec<(&str, &StatementTypeMetrics)> = summary
        .statement_type_summary
        .iter()
        .map(|(name, metrics)| (name.as_str(), metrics))
        .collect();
    types.sort_by(|a, b| {
        b.1.total_queries
            .cmp(&a.1.total_queries)
            .then_with(|| a.0.cmp(b.0))
    });
    types
}

fn source_count(metrics: &StatementTypeMetrics, source: StatementTypeSource) -> usize {
    metrics.source_breakdown.get(&source).copied().unwrap_or(0)
}

/// Renders the `[[]]report.md` document for one source or the whole run.
pub fn render_report_markdown(source_path: &Path, summary: &AggregateSummary) -> String {
    let types = ordered_types(summary);
    let total_by = |source: StatementTypeSource| {
        types
            .iter()
            .map(|(_, metrics)| source_count(metrics, source))
            .sum::<usize>()
    };
    let parser_count = total_by(StatementTypeSource::Parser);
    let fallback_count = total_by(StatementTypeSource::Fallback);
    let unresolved_count = total_by(StatementTypeSource::Unknown);
    let parser_unknown_total: usize = types
        .iter()
        .map(|(_, metrics)| {
            metrics
                .parser_reported_types
                .get("UNKNOWN")
                .copied()
                .unwrap_or(0)
        })
        .sum();

    let name = source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_path.display().to_string());

    let mut lines = vec![
        format!("# Lineage Report — {name}"),
        String::new(),
        format!("* Source path: `{}`", source_path.display()),
        format!("* Folder flags: {}", summary.flags.prefix()),
        format!("* Queries analyzed: {}", summary.overview.query_count),
        format!(
            "* Total parser time: {:.3} ms",
            summary.overview.timing_ms_total
        ),
        format!("* Statement types via parser: {parser_count}"),
        format!("* Statement types via fallback: {fallback_count}"),
    ];
    if unresolved_count > 0 {
        lines.push(format!(
            "* Statement types still unknown: {unresolved_count}"
        ));
    }
    if parser_unknown_total > 0 {
        lines.push(format!(
            "* Parser returned UNKNOWN for {parser_unknown_total} statement(s); fallback heuristics attempted."
        ));
    }
    lines.extend([
        String::new(),
        "### Legend".to_string(),
        String::new(),
        "- `Parser` vs `Fallback`: whether the parser supplied the statement type or the regex fallback classifier did.".to_string(),
        "- Flags: `ERR`=parser/RPC error, `GAP`=missing upstream or downstream lineage, `LIN`=complete table lineage, `SELF`=self-referential lineage, `COL`=column-level lineage detected.".to_string(),
    ]);

    if types.is_empty() {
        lines.push(String::new());
        lines.push("No statement types were recorded for this source.".to_string());
        lines.push(String::new());
        return lines.join("\n");
    }

    push_section(
        &mut lines,
        "Statement Type Overview",
        "_How many statements of each type we parsed, whether they succeeded, and how long they took._",
    );
    let overview_rows: Vec<Vec<String>> = types
        .iter()
        .map(|(name, metrics)| {
            vec![
                name.to_string(),
                metrics.total_queries.to_string(),
                metrics.success_count.to_string(),
                metrics.error_count.to_string(),
                format!("{:.1}%", metrics.success_rate),
                format!("{:.2}", metrics.timing_ms.avg),
                format!("{:.2}", metrics.timing_ms.p95),
            ]
        })
        .collect();
    lines.extend(format_markdown_table(
        &[
            "Statement Type",
            "Queries",
            "Success",
            "Errors",
            "Success %",
            "Avg ms",
            "P95 ms",
        ],
        &overview_rows,
    ));

    push_section(
        &mut lines,
        "Parser Classification",
        "_Breakdown of how each statement type was classified: parser-provided vs fallback vs still unknown, plus the raw parser labels returned._",
    );
    let classification_rows: Vec<Vec<String>> = types
        .iter()
        .map(|(name, metrics)| {
            vec![
                name.to_string(),
                source_count(metrics, StatementTypeSource::Parser).to_string(),
                source_count(metrics, StatementTypeSource::Fallback).to_string(),
                source_count(metrics, StatementTypeSource::Unknown).to_string(),
                format_count_pairs(&metrics.parser_reported_types),
            ]
        })
        .collect();
    lines.extend(format_markdown_table(
        &[
            "Statement Type",
            "Parser",
            "Fallback",
            "Unresolved",
            "Parser reported",
        ],
        &classification_rows,
    ));

    push_section(
        &mut lines,
        "Flag Distribution by Statement Type",
        "_This highlights quality signals per statement type. Use it to spot types that systematically have errors, missing lineage, or column-level coverage._",
    );
    if summary.statement_type_flag_keys.is_empty() {
        lines.push("No flags recorded for this source.".to_string());
    } else {
        let mut headers = vec!["Statement Type".to_string()];
        headers.extend(
            summary
                .statement_type_flag_keys
                .iter()
                .map(|flag| flag.to_string()),
        );
        let flag_rows: Vec<Vec<String>> = types
            .iter()
            .map(|(name, metrics)| {
                let mut row = vec![name.to_string()];
                row.extend(summary.statement_type_flag_keys.iter().map(|flag| {
                    metrics
                        .flag_counts
                        .get(flag)
                        .copied()
                        .unwrap_or(0)
                        .to_string()
                }));
                row
            })
            .collect();
        lines.extend(format_markdown_table(&headers, &flag_rows));
    }

    push_section(
        &mut lines,
        "Error Class Distribution by Statement Type",
        "_Summaries of the parser's `debugInfoError` messages. These usually explain why lineage was incomplete for a statement type._",
    );
    if summary.statement_type_error_classes.is_empty() {
        lines.push("No error classes detected for this source.".to_string());
    } else {
        let error_rows = count_rows(&types, |metrics| &metrics.error_class_counts);
        lines.extend(format_markdown_table(
            &["Statement Type", "Error Class", "Count"],
            &error_rows,
        ));
    }

    push_section(
        &mut lines,
        "Parser Error Breakdown",
        "_The exact parser error strings returned. Use this to trace concrete failures back to the source SQL._",
    );
    let parser_error_rows = count_rows(&types, |metrics| &metrics.parser_error_counts);
    lines.extend(format_markdown_table(
        &["Statement Type", "Parser Error", "Count"],
        &parser_error_rows,
    ));

    lines.push(String::new());
    lines.join("\n")
}

fn push_section(lines: &mut Vec<String>, title: &str, description: &str) {
    lines.extend([
        String::new(),
        format!("## {title}"),
        String::new(),
        description.to_string(),
        String::new(),
    ]);
}

fn count_rows<'a>(
    types: &[(&'a str, &'a StatementTypeMetrics)],
    counts: impl Fn(&'a StatementTypeMetrics) -> &'a BTreeMap<String, usize>,
) -> Vec<Vec<String>> {
    types
        .iter()
        .flat_map(|(name, metrics)| {
            ranked(counts(*metrics))
                .into_iter()
                .map(move |(label, count)| vec![name.to_string(), label.to_string(), count.to_string()])
        })
        .collect()
}
