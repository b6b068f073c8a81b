//! Reductions over many outcomes.
//!
//! Every function here is a single pass (or a sort) over a slice of outcomes.
//! They accept `&[QueryOutcome]` as well as `&[&QueryOutcome]`, so grouped
//! views can be summarized without cloning. Orderings use explicit sort keys;
//! map-backed histograms iterate in key order.

use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::flags::aggregate_flags;
use crate::types::{
    AggregateSummary, BucketStats, ComplexityBreakdown, ComplexityBucket, ConfidenceBands,
    CountEntry, ErrorBreakdown, ErrorTypeEntry, Flag, GroupStats, Overview, QueryComplexity, QueryOutcome,
    StatementTypeBreakdown, StatementTypeMetrics, TimingSummary, ValidationResult,
    ValidationStatus, ValidationSummary,
};

/// Confidence at or above which a result counts as high confidence.
pub const HIGH_CONFIDENCE: f64 = 0.9;
/// Lower bound of the medium confidence band.
pub const MEDIUM_CONFIDENCE: f64 = 0.7;

const NONE_LABEL: &str = "<none>";
const UNKNOWN_LABEL: &str = "<unknown>";
const UNAVAILABLE_LABEL: &str = "UNAVAILABLE";
const UNKNOWN_CATEGORY: &str = "unknown";
const UNKNOWN_ERROR_TYPE: &str = "Unknown";
const EXAMPLE_MESSAGE_CHARS: usize = 200;

/// Reduces a debug error message to its class: the text before the first
/// `:`, `.` or `<`.
///
/// Absent or blank messages are `<none>`; messages that are empty after the
/// cut are `<unknown>`.
pub fn normalize_error_label(error: Option<&str>) -> String {
    let Some(text) = error.map(str::trim).filter(|text| !text.is_empty()) else {
        return NONE_LABEL.to_string();
    };
    let cut = text.find([':', '.', '<']).unwrap_or(text.len());
    let label = text[..cut].trim();
    if label.is_empty() {
        UNKNOWN_LABEL.to_string()
    } else {
        label.to_string()
    }
}

/// Percentile by linear interpolation between order statistics at rank `(n - 1) * q`.
///
/// Returns `0.0` for an empty input.
pub fn percentile(values: &[f64], quantile: f64) -> f64 {
    let ordered = sorted(values);
    match ordered.len() {
        0 => 0.0,
        1 => ordered[0],
        len => {
            let rank = (len - 1) as f64 * quantile.clamp(0.0, 1.0);
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            if lower == upper {
                ordered[lower]
            } else {
                ordered[lower] * (upper as f64 - rank) + ordered[upper] * (rank - lower as f64)
            }
        }
    }
}

/// Median; the mean of the two middle values for even-length input.
pub fn median(values: &[f64]) -> f64 {
    let ordered = sorted(values);
    let len = ordered.len();
    match len {
        0 => 0.0,
        _ if len % 2 == 1 => ordered[len / 2],
        _ => (ordered[len / 2 - 1] + ordered[len / 2]) / 2.0,
    }
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut ordered = values.to_vec();
    ordered.sort_by(f64::total_cmp);
    ordered
}

/// Mean, median, p95, min and max. All zero for an empty input.
pub fn timing_summary(timings: &[f64]) -> TimingSummary {
    if timings.is_empty() {
        return TimingSummary::default();
    }
    TimingSummary {
        avg: timings.iter().sum::<f64>() / timings.len() as f64,
        median: median(timings),
        p95: percentile(timings, 0.95),
        min: timings.iter().copied().fold(f64::INFINITY, f64::min),
        max: timings.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    }
}

fn count_where<O: Borrow<QueryOutcome>>(
    outcomes: &[O],
    predicate: impl Fn(&QueryOutcome) -> bool,
) -> usize {
    outcomes
        .iter()
        .filter(|outcome| predicate((*outcome).borrow()))
        .count()
}

fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

fn has_table_lineage(outcome: &QueryOutcome) -> bool {
    !outcome.upstreams.is_empty() || !outcome.downstreams.is_empty()
}

/// Headline counts over a group of outcomes.
pub fn compute_overview<O: Borrow<QueryOutcome>>(outcomes: &[O]) -> Overview {
    let table_lineage_count = count_where(outcomes, has_table_lineage);
    Overview {
        query_count: outcomes.len(),
        success_count: count_where(outcomes, QueryOutcome::succeeded),
        parser_error_count: count_where(outcomes, |o| o.parser_error.is_some()),
        rpc_error_count: count_where(outcomes, |o| o.rpc_error.is_some()),
        error_count: count_where(outcomes, |o| o.has_flag(Flag::Err)),
        lineage_count: count_where(outcomes, |o| o.has_flag(Flag::Lin)),
        gap_lineage_count: count_where(outcomes, |o| o.has_flag(Flag::Gap)),
        self_referential_count: count_where(outcomes, |o| o.has_flag(Flag::SelfRef)),
        column_lineage_count: count_where(outcomes, |o| o.has_flag(Flag::Col)),
        table_lineage_count,
        table_lineage_rate: rate(table_lineage_count, outcomes.len()),
        timing_ms_total: outcomes.iter().map(|o| o.borrow().timing_ms).sum(),
    }
}

/// Per-statement-type metrics, plus the flags and error classes that occur.
pub fn compute_statement_type_metrics<O: Borrow<QueryOutcome>>(
    outcomes: &[O],
) -> StatementTypeBreakdown {
    let mut by_type: BTreeMap<String, (StatementTypeMetrics, Vec<f64>)> = BTreeMap::new();
    let mut all_flags = BTreeSet::new();
    let mut all_error_classes = BTreeSet::new();

    for outcome in outcomes {
        let outcome = outcome.borrow();
        let (stats, timings) = by_type
            .entry(outcome.statement_type.clone())
            .or_default();

        stats.total_queries += 1;
        timings.push(outcome.timing_ms);
        if outcome.succeeded() {
            stats.success_count += 1;
        } else {
            stats.error_count += 1;
        }
        if outcome.confidence() >= HIGH_CONFIDENCE {
            stats.high_confidence += 1;
        }
        if outcome.column_lineage_count() > 0 {
            stats.with_column_lineage += 1;
        }

        *stats
            .source_breakdown
            .entry(outcome.statement_type_source)
            .or_default() += 1;
        let parser_label = outcome
            .parser_statement_type
            .clone()
            .unwrap_or_else(|| UNAVAILABLE_LABEL.to_string());
        *stats.parser_reported_types.entry(parser_label).or_default() += 1;

        for flag in &outcome.flags {
            *stats.flag_counts.entry(flag).or_default() += 1;
            all_flags.insert(flag);
        }

        let error_class = normalize_error_label(outcome.debug_info_error());
        all_error_classes.insert(error_class.clone());
        *stats.error_class_counts.entry(error_class).or_default() += 1;

        let parser_error = outcome
            .parser_error
            .clone()
            .unwrap_or_else(|| NONE_LABEL.to_string());
        *stats.parser_error_counts.entry(parser_error).or_default() += 1;
    }

    let by_type = by_type
        .into_iter()
        .map(|(statement_type, (mut stats, timings))| {
            stats.timing_ms = timing_summary(&timings);
            stats.success_rate = rate(stats.success_count, stats.total_queries) * 100.0;
            stats.error_rate = if stats.total_queries == 0 {
                0.0
            } else {
                100.0 - stats.success_rate
            };
            stats.high_confidence_rate = rate(stats.high_confidence, stats.total_queries) * 100.0;
            stats.column_lineage_rate =
                rate(stats.with_column_lineage, stats.total_queries) * 100.0;
            (statement_type, stats)
        })
        .collect();

    StatementTypeBreakdown {
        by_type,
        flag_keys: all_flags.into_iter().collect(),
        error_class_keys: all_error_classes.into_iter().collect(),
    }
}

/// Histogram of debug error classes, most frequent first.
pub fn build_debug_error_summary<O: Borrow<QueryOutcome>>(outcomes: &[O]) -> Vec<CountEntry> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for outcome in outcomes {
        let label = normalize_error_label(outcome.borrow().debug_info_error());
        *counts.entry(label).or_default() += 1;
    }
    rank_counts(counts)
}

/// Sorts a histogram by `(-count, lowercase label, label)`.
pub fn rank_counts(counts: BTreeMap<String, usize>) -> Vec<CountEntry> {
    let mut entries: Vec<CountEntry> = counts
        .into_iter()
        .map(|(message, count)| CountEntry { message, count })
        .collect();
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.message.to_lowercase().cmp(&b.message.to_lowercase()))
            .then_with(|| a.message.cmp(&b.message))
    });
    entries
}

/// Groups outcomes by source path, in first-seen order.
pub fn group_by_source(outcomes: &[QueryOutcome]) -> Vec<(&Path, Vec<&QueryOutcome>)> {
    let mut groups: Vec<(&Path, Vec<&QueryOutcome>)> = Vec::new();
    for outcome in outcomes {
        let path = outcome.task.source_path.as_path();
        match groups.iter_mut().find(|(source, _)| *source == path) {
            Some((_, members)) => members.push(outcome),
            None => groups.push((path, vec![outcome])),
        }
    }
    groups
}

/// Counts outcomes in each confidence band.
pub fn confidence_bands<O: Borrow<QueryOutcome>>(outcomes: &[O]) -> ConfidenceBands {
    let high = count_where(outcomes, |o| o.confidence() >= HIGH_CONFIDENCE);
    let medium = count_where(outcomes, |o| {
        (MEDIUM_CONFIDENCE..HIGH_CONFIDENCE).contains(&o.confidence())
    });
    let low = count_where(outcomes, |o| {
        o.confidence() > 0.0 && o.confidence() < MEDIUM_CONFIDENCE
    });
    let total = outcomes.len();
    ConfidenceBands {
        high,
        medium,
        low,
        high_rate: rate(high, total),
        medium_rate: rate(medium, total),
        low_rate: rate(low, total),
    }
}

/// Success rates per complexity bucket for CTE, join and subquery counts.
pub fn complexity_breakdown<O: Borrow<QueryOutcome>>(outcomes: &[O]) -> ComplexityBreakdown {
    ComplexityBreakdown {
        by_cte: bucket_stats(outcomes, |c| c.cte_count),
        by_join: bucket_stats(outcomes, |c| c.join_count),
        by_subquery: bucket_stats(outcomes, |c| c.subquery_count),
    }
}

fn bucket_stats<O: Borrow<QueryOutcome>>(
    outcomes: &[O],
    metric: impl Fn(&QueryComplexity) -> usize,
) -> BTreeMap<ComplexityBucket, BucketStats> {
    let mut buckets: BTreeMap<ComplexityBucket, BucketStats> = BTreeMap::new();
    for outcome in outcomes {
        let outcome = outcome.borrow();
        let stats = buckets
            .entry(ComplexityBucket::for_count(metric(&outcome.complexity)))
            .or_default();
        stats.total += 1;
        if outcome.succeeded() {
            stats.success_count += 1;
        }
    }
    for stats in buckets.values_mut() {
        stats.success_rate = rate(stats.success_count, stats.total);
    }
    buckets
}

/// Pass rate and mean precision/recall over validated outcomes.
pub fn validation_summary<O: Borrow<QueryOutcome>>(outcomes: &[O]) -> ValidationSummary {
    let validated: Vec<&QueryOutcome> = outcomes
        .iter()
        .map(|outcome| outcome.borrow())
        .filter(|outcome| outcome.validation_status.is_validated())
        .collect();
    if validated.is_empty() {
        return ValidationSummary::default();
    }

    let passed = validated
        .iter()
        .filter(|outcome| outcome.validation_status == ValidationStatus::Passed)
        .count();
    let results: Vec<_> = validated
        .iter()
        .filter_map(|outcome| outcome.validation.as_ref())
        .collect();
    let mean = |value: fn(&ValidationResult) -> f64| {
        if results.is_empty() {
            0.0
        } else {
            results.iter().map(|result| value(result)).sum::<f64>() / results.len() as f64
        }
    };

    ValidationSummary {
        validated_count: validated.len(),
        passed,
        pass_rate: rate(passed, validated.len()),
        avg_table_precision: mean(|r: &ValidationResult| r.tables_precision),
        avg_table_recall: mean(|r: &ValidationResult| r.tables_recall),
        avg_column_precision: mean(|r: &ValidationResult| r.columns_precision),
        avg_column_recall: mean(|r: &ValidationResult| r.columns_recall),
    }
}

/// Category of a source: the name of its parent directory, for paths of at
/// least three components (`tests/01-basic/a.sql` is `01-basic`). Shorter
/// paths are `unknown`.
pub fn category_of(source_path: &Path) -> String {
    if source_path.components().count() < 3 {
        return UNKNOWN_CATEGORY.to_string();
    }
    source_path
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string())
}

/// Headline statistics per source category.
pub fn category_stats<O: Borrow<QueryOutcome>>(outcomes: &[O]) -> BTreeMap<String, GroupStats> {
    let mut categories: BTreeMap<String, GroupStats> = BTreeMap::new();
    for outcome in outcomes {
        let outcome = outcome.borrow();
        let stats = categories
            .entry(category_of(&outcome.task.source_path))
            .or_default();
        stats.total += 1;
        if outcome.succeeded() {
            stats.successful += 1;
        }
        if outcome.confidence() >= HIGH_CONFIDENCE {
            stats.high_confidence += 1;
        }
        if outcome.column_lineage_count() > 0 {
            stats.with_column_lineage += 1;
        }
    }
    for stats in categories.values_mut() {
        stats.success_rate = rate(stats.successful, stats.total);
        stats.high_confidence_rate = rate(stats.high_confidence, stats.total);
        stats.column_lineage_rate = rate(stats.with_column_lineage, stats.total);
    }
    categories
}

/// Type of an error message: the text before its first `:`, or `Unknown`
/// when there is no colon.
pub fn error_type_of(message: &str) -> String {
    match message.split_once(':') {
        Some((error_type, _)) => error_type.to_string(),
        None => UNKNOWN_ERROR_TYPE.to_string(),
    }
}

/// Groups outcome error messages by type, ranked by `(-count, type)`.
///
/// The example of each type is its first outcome in input order.
pub fn error_breakdown<O: Borrow<QueryOutcome>>(outcomes: &[O]) -> ErrorBreakdown {
    let mut by_type: BTreeMap<String, ErrorTypeEntry> = BTreeMap::new();
    let mut error_count = 0;
    for outcome in outcomes {
        let outcome = outcome.borrow();
        let Some(message) = outcome.error_message().filter(|m| !m.is_empty()) else {
            continue;
        };
        error_count += 1;
        let error_type = error_type_of(message);
        by_type
            .entry(error_type.clone())
            .or_insert_with(|| ErrorTypeEntry {
                error_type,
                count: 0,
                example_query: outcome.task.identifier.clone(),
                example_message: message.chars().take(EXAMPLE_MESSAGE_CHARS).collect(),
            })
            .count += 1;
    }

    let mut by_type: Vec<ErrorTypeEntry> = by_type.into_values().collect();
    by_type.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.error_type.cmp(&b.error_type)));
    ErrorBreakdown {
        error_count,
        error_rate: rate(error_count, outcomes.len()),
        by_type,
    }
}

/// Builds the complete summary for one source, or for a whole run.
pub fn summarize<O: Borrow<QueryOutcome>>(
    source: impl Into<String>,
    outcomes: &[O],
) -> AggregateSummary {
    let breakdown = compute_statement_type_metrics(outcomes);
    let timings: Vec<f64> = outcomes.iter().map(|o| o.borrow().timing_ms).collect();

    AggregateSummary {
        source: source.into(),
        flags: aggregate_flags(outcomes.iter().map(|o| &o.borrow().flags)),
        overview: compute_overview(outcomes),
        timing_ms: timing_summary(&timings),
        debug_info_error_counts: build_debug_error_summary(outcomes),
        statement_type_summary: breakdown.by_type,
        statement_type_flag_keys: breakdown.flag_keys,
        statement_type_error_classes: breakdown.error_class_keys,
        confidence: confidence_bands(outcomes),
        complexity: complexity_breakdown(outcomes),
        validation: validation_summary(outcomes),
        by_category: category_stats(outcomes),
        errors: error_breakdown(outcomes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{outcome_with, transport_failure};
    use crate::types::StatementTypeSource;
    use rstest::rstest;

    #[rstest]
    #[case(None, "<none>")]
    #[case(Some("   "), "<none>")]
    #[case(Some("Unsupported statement: COLLECT"), "Unsupported statement")]
    #[case(Some("Table not found. db.x"), "Table not found")]
    #[case(Some("Failed <class 'KeyError'>"), "Failed")]
    #[case(Some(": leading colon"), "<unknown>")]
    #[case(Some("no delimiters here"), "no delimiters here")]
    fn test_normalize_error_label(#[case] input: Option<&str>, #[case] expected: &str) {
        assert_eq!(normalize_error_label(input), expected);
    }

    #[test]
    fn test_percentile_interpolates() {
        let values: Vec<f64> = (1..=10).map(|v| (v * 10) as f64).collect();
        assert!((percentile(&values, 0.95) - 95.5).abs() < 1e-9);
        assert_eq!(percentile(&values, 0.0), 10.0);
        assert_eq!(percentile(&values, 1.0), 100.0);
        assert_eq!(percentile(&[42.0], 0.95), 42.0);
        assert_eq!(percentile(&[], 0.95), 0.0);
    }

    #[test]
    fn test_timing_summary() {
        let summary = timing_summary(&[4.0, 1.0, 3.0, 2.0]);
        assert_eq!(summary.avg, 2.5);
        assert_eq!(summary.median, 2.5);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 4.0);
        assert_eq!(timing_summary(&[]), TimingSummary::default());
    }

    #[rstest]
    #[case("tests/01-basic/a.sql", "01-basic")]
    #[case("/abs/a.sql", "abs")]
    #[case("queries/a.sql", "unknown")]
    #[case("a.sql", "unknown")]
    fn test_category_of(#[case] path: &str, #[case] expected: &str) {
        assert_eq!(category_of(Path::new(path)), expected);
    }

    #[rstest]
    #[case("Transport error: connection refused", "Transport error")]
    #[case("ParseError: at 1:4", "ParseError")]
    #[case("no colon here", "Unknown")]
    fn test_error_type_of(#[case] message: &str, #[case] expected: &str) {
        assert_eq!(error_type_of(message), expected);
    }

    #[test]
    fn test_error_breakdown_ranks_types() {
        let long_message = format!("Table not found: {}", "x".repeat(300));
        let outcomes = vec![
            outcome_with("a.sql", &["a"], &["b"], None),
            transport_failure("b.sql"),
            outcome_with("c.sql", &["a"], &[], Some(&long_message)),
            transport_failure("d.sql"),
        ];
        let breakdown = error_breakdown(&outcomes);

        assert_eq!(breakdown.error_count, 3);
        assert_eq!(breakdown.error_rate, 0.75);
        let types: Vec<_> = breakdown
            .by_type
            .iter()
            .map(|e| (e.error_type.as_str(), e.count))
            .collect();
        // "connection refused" has no colon
        assert_eq!(types, vec![("Unknown", 2), ("Table not found", 1)]);
        assert_eq!(breakdown.by_type[0].example_query, "b.sql:1");
        assert_eq!(breakdown.by_type[1].example_message.chars().count(), 200);
        assert!(breakdown.by_type[1].example_message.starts_with("Table not found: xxx"));

        assert_eq!(error_breakdown(&[] as &[QueryOutcome]), ErrorBreakdown::default());
    }

    #[test]
    fn test_overview_counts() {
        let outcomes = vec![
            outcome_with("a.sql", &["a"], &["b"], None),
            outcome_with("a.sql", &["a"], &[], Some("Bad thing: x")),
            transport_failure("b.sql"),
        ];
        let overview = compute_overview(&outcomes);

        assert_eq!(overview.query_count, 3);
        assert_eq!(overview.success_count, 1);
        assert_eq!(overview.parser_error_count, 1);
        assert_eq!(overview.rpc_error_count, 1);
        assert_eq!(overview.error_count, 2);
        assert_eq!(overview.lineage_count, 1);
        assert_eq!(overview.gap_lineage_count, 1);
        assert_eq!(overview.table_lineage_count, 2);
        assert!((overview.table_lineage_rate - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_statement_type_metrics() {
        let outcomes = vec![
            outcome_with("a.sql", &["a"], &["b"], None),
            outcome_with("a.sql", &["a"], &[], Some("Bad thing: x")),
            transport_failure("b.sql"),
        ];
        let breakdown = compute_statement_type_metrics(&outcomes);
        let insert = &breakdown.by_type["INSERT"];

        assert_eq!(insert.total_queries, 3);
        assert_eq!(insert.success_count, 1);
        assert!((insert.success_rate - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(insert.flag_counts[&Flag::Err], 2);
        assert_eq!(insert.high_confidence, 0);
        assert_eq!(insert.with_column_lineage, 0);
        assert_eq!(insert.column_lineage_rate, 0.0);
        assert_eq!(insert.error_class_counts["Bad thing"], 1);
        assert_eq!(insert.error_class_counts["<none>"], 2);
        assert_eq!(insert.parser_error_counts["<none>"], 2);
        assert_eq!(insert.parser_reported_types["UNAVAILABLE"], 3);
        assert_eq!(insert.source_breakdown[&StatementTypeSource::Fallback], 3);
        assert_eq!(breakdown.flag_keys, vec![Flag::Err, Flag::Gap, Flag::Lin]);
        assert_eq!(breakdown.error_class_keys, vec!["<none>", "Bad thing"]);
    }

    #[test]
    fn test_debug_error_summary_ordering() {
        let outcomes = vec![
            outcome_with("a.sql", &[], &[], Some("beta: 1")),
            outcome_with("a.sql", &[], &[], Some("Alpha: 1")),
            outcome_with("a.sql", &[], &[], Some("beta: 2")),
            outcome_with("a.sql", &[], &[], None),
        ];
        let summary = build_debug_error_summary(&outcomes);
        let labels: Vec<_> = summary.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(labels, vec!["beta", "<none>", "Alpha"]);
        assert_eq!(summary[0].count, 2);
    }

    #[test]
    fn test_group_by_source_first_seen_order() {
        let outcomes = vec![
            outcome_with("z.sql", &[], &[], None),
            outcome_with("a.sql", &[], &[], None),
            outcome_with("z.sql", &[], &[], None),
        ];
        let groups = group_by_source(&outcomes);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, Path::new("z.sql"));
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, Path::new("a.sql"));

        // grouped views summarize without cloning
        let overview = compute_overview(&groups[0].1);
        assert_eq!(overview.query_count, 2);
    }

    #[test]
    fn test_confidence_bands_and_categories() {
        let mut high = outcome_with("tests/01-basic/a.sql", &["a"], &["b"], None);
        high.result.as_mut().unwrap().debug_info.confidence = 0.95;
        let mut medium = outcome_with("tests/01-basic/b.sql", &["a"], &["b"], None);
        medium.result.as_mut().unwrap().debug_info.confidence = 0.7;
        let mut low = outcome_with("c.sql", &["a"], &["b"], None);
        low.result.as_mut().unwrap().debug_info.confidence = 0.2;
        let outcomes = vec![high, medium, low, transport_failure("d.sql")];

        let bands = confidence_bands(&outcomes);
        assert_eq!((bands.high, bands.medium, bands.low), (1, 1, 1));
        assert_eq!(bands.high_rate, 0.25);

        let categories = category_stats(&outcomes);
        assert_eq!(categories["01-basic"].total, 2);
        assert_eq!(categories["01-basic"].high_confidence, 1);

        let by_type = compute_statement_type_metrics(&outcomes);
        assert_eq!(by_type.by_type["INSERT"].high_confidence, 1);
        assert_eq!(by_type.by_type["INSERT"].high_confidence_rate, 25.0);
        assert_eq!(categories["unknown"].total, 2);
    }

    #[test]
    fn test_complexity_buckets() {
        let mut simple = outcome_with("a.sql", &[], &[], None);
        simple.complexity.join_count = 2;
        let mut complex = transport_failure("a.sql");
        complex.complexity.join_count = 9;
        let breakdown = complexity_breakdown(&[simple, complex]);

        assert_eq!(breakdown.by_join[&ComplexityBucket::Simple].success_rate, 1.0);
        assert_eq!(breakdown.by_join[&ComplexityBucket::Complex].success_count, 0);
        assert!(!breakdown.by_join.contains_key(&ComplexityBucket::None));
        assert_eq!(breakdown.by_cte[&ComplexityBucket::None].total, 2);
    }

    #[test]
    fn test_validation_summary() {
        let mut passed = outcome_with("a.sql", &["a"], &["b"], None);
        passed.validation_status = ValidationStatus::Passed;
        passed.validation = Some(ValidationResult {
            tables_match: true,
            columns_match: true,
            tables_precision: 1.0,
            tables_recall: 1.0,
            columns_precision: 1.0,
            columns_recall: 1.0,
            ..Default::default()
        });
        let mut failed = outcome_with("a.sql", &["a"], &["b"], None);
        failed.validation_status = ValidationStatus::Failed;
        failed.validation = Some(ValidationResult::default());
        let unvalidated = outcome_with("a.sql", &["a"], &["b"], None);

        let summary = validation_summary(&[passed, failed, unvalidated]);
        assert_eq!(summary.validated_count, 2);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.pass_rate, 0.5);
        assert_eq!(summary.avg_table_precision, 0.5);
    }

    #[test]
    fn test_summarize_aggregates_flags() {
        let outcomes = vec![
            outcome_with("a.sql", &[], &[], None),
            outcome_with("a.sql", &["a"], &["b"], None),
        ];
        let summary = summarize("a.sql", &outcomes);
        assert_eq!(summary.flags.prefix(), "[LIN]");
        assert_eq!(summary.overview.query_count, 2);
        assert_eq!(summary.statement_type_flag_keys, vec![Flag::Lin, Flag::Ok]);
    }
}
