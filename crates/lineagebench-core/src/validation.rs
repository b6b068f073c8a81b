//! Comparison of parser output against expected lineage.

use std::collections::BTreeSet;

use crate::types::{ExpectedLineage, ParsedLineageResult, ValidationResult};

/// Compares a parser result with an expected record.
///
/// Tables are compared as the set union of upstream and downstream
/// identifiers. Columns are compared as directed `(upstream, downstream)`
/// pairs of `table:column` keys. Actual edges without a downstream column
/// are skipped; expected ones are keyed as `:`. A granularity with an empty
/// expected set keeps its default metrics.
pub fn validate(actual: &ParsedLineageResult, expected: &ExpectedLineage) -> ValidationResult {
    let mut validation = ValidationResult::default();

    let actual_tables = table_set(&actual.in_tables, &actual.out_tables);
    let expected_tables = table_set(&expected.in_tables, &expected.out_tables);
    if !expected_tables.is_empty() {
        let (precision, recall) = precision_recall(&actual_tables, &expected_tables);
        validation.tables_precision = precision;
        validation.tables_recall = recall;
        validation.tables_match = actual_tables == expected_tables;
        validation.missing_tables = expected_tables.difference(&actual_tables).cloned().collect();
        validation.extra_tables = actual_tables.difference(&expected_tables).cloned().collect();
    }

    let actual_pairs: BTreeSet<(String, String)> = actual
        .column_lineage
        .iter()
        .flat_map(|edge| edge.comparison_pairs())
        .collect();
    let expected_pairs: BTreeSet<(String, String)> = expected
        .column_lineage
        .iter()
        .flat_map(|edge| edge.expected_comparison_pairs())
        .collect();
    if !expected_pairs.is_empty() {
        let (precision, recall) = precision_recall(&actual_pairs, &expected_pairs);
        validation.columns_precision = precision;
        validation.columns_recall = recall;
        validation.columns_match = actual_pairs == expected_pairs;
        validation.missing_columns = expected_pairs
            .difference(&actual_pairs)
            .map(render_pair)
            .collect();
        validation.extra_columns = actual_pairs
            .difference(&expected_pairs)
            .map(render_pair)
            .collect();
    }

    validation
}

fn table_set(in_tables: &[String], out_tables: &[String]) -> BTreeSet<String> {
    in_tables.iter().chain(out_tables).cloned().collect()
}

fn render_pair((upstream, downstream): &(String, String)) -> String {
    format!("{upstream}->{downstream}")
}

fn precision_recall<T: Ord>(actual: &BTreeSet<T>, expected: &BTreeSet<T>) -> (f64, f64) {
    let true_positives = actual.intersection(expected).count() as f64;
    let precision = if actual.is_empty() {
        0.0
    } else {
        true_positives / actual.len() as f64
    };
    let recall = if expected.is_empty() {
        0.0
    } else {
        true_positives / expected.len() as f64
    };
    (precision, recall)
}
