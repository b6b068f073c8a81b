//! Aggregate statistics over many outcomes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::common::{Flag, FlagSet, StatementTypeSource};

/// Run- or source-level headline counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Overview {
    pub query_count: usize,
    pub success_count: usize,
    pub parser_error_count: usize,
    pub rpc_error_count: usize,
    /// Outcomes flagged `ERR`
    pub error_count: usize,
    /// Outcomes flagged `LIN`
    pub lineage_count: usize,
    /// Outcomes flagged `GAP`
    pub gap_lineage_count: usize,
    /// Outcomes flagged `SELF`
    pub self_referential_count: usize,
    /// Outcomes flagged `COL`
    pub column_lineage_count: usize,
    /// Outcomes with any upstream or downstream table
    pub table_lineage_count: usize,
    /// Fraction in `[0, 1]`
    pub table_lineage_rate: f64,
    pub timing_ms_total: f64,
}

/// Timing distribution in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TimingSummary {
    pub avg: f64,
    pub median: f64,
    pub p95: f64,
    pub min: f64,
    pub max: f64,
}

/// Statistics for all outcomes sharing one statement type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatementTypeMetrics {
    pub total_queries: usize,
    pub success_count: usize,
    pub error_count: usize,
    /// Percent
    pub success_rate: f64,
    /// Percent
    pub error_rate: f64,
    /// Confidence `>= 0.9`
    pub high_confidence: usize,
    /// Percent
    pub high_confidence_rate: f64,
    pub with_column_lineage: usize,
    /// Percent
    pub column_lineage_rate: f64,
    pub timing_ms: TimingSummary,
    pub flag_counts: BTreeMap<Flag, usize>,
    /// Normalized debug-error labels
    pub error_class_counts: BTreeMap<String, usize>,
    /// Raw parser error strings, `<none>` when absent
    pub parser_error_counts: BTreeMap<String, usize>,
    pub source_breakdown: BTreeMap<StatementTypeSource, usize>,
    /// Parser labels, `UNAVAILABLE` when absent
    pub parser_reported_types: BTreeMap<String, usize>,
}

/// Per-type metrics plus the flag keys and error classes that occur anywhere in them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StatementTypeBreakdown {
    pub by_type: BTreeMap<String, StatementTypeMetrics>,
    /// Present flags in precedence order
    pub flag_keys: Vec<Flag>,
    /// Present error classes, sorted
    pub error_class_keys: Vec<String>,
}

/// One row of a label histogram.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CountEntry {
    pub message: String,
    pub count: usize,
}

/// Complexity bucket for a structural count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityBucket {
    /// 0
    None,
    /// 1..=2
    Simple,
    /// 3..=5
    Moderate,
    /// More than 5
    Complex,
}

impl ComplexityBucket {
    pub fn for_count(count: usize) -> Self {
        match count {
            0 => Self::None,
            1..=2 => Self::Simple,
            3..=5 => Self::Moderate,
            _ => Self::Complex,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Simple => "simple",
            Self::Moderate => "moderate",
            Self::Complex => "complex",
        }
    }
}

impl fmt::Display for ComplexityBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BucketStats {
    pub total: usize,
    pub success_count: usize,
    /// Fraction in `[0, 1]`
    pub success_rate: f64,
}

/// Success by complexity bucket. Empty buckets are omitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComplexityBreakdown {
    pub by_cte: BTreeMap<ComplexityBucket, BucketStats>,
    pub by_join: BTreeMap<ComplexityBucket, BucketStats>,
    pub by_subquery: BTreeMap<ComplexityBucket, BucketStats>,
}

/// Confidence distribution. Rates are fractions of all outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConfidenceBands {
    /// `>= 0.9`
    pub high: usize,
    /// `0.7 <= c < 0.9`
    pub medium: usize,
    /// `0 < c < 0.7`
    pub low: usize,
    pub high_rate: f64,
    pub medium_rate: f64,
    pub low_rate: f64,
}

/// Aggregate of validation results over validated outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationSummary {
    pub validated_count: usize,
    pub passed: usize,
    pub pass_rate: f64,
    pub avg_table_precision: f64,
    pub avg_table_recall: f64,
    pub avg_column_precision: f64,
    pub avg_column_recall: f64,
}

/// Headline statistics for an arbitrary group (category). Rates are fractions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GroupStats {
    pub total: usize,
    pub successful: usize,
    pub success_rate: f64,
    pub high_confidence: usize,
    pub high_confidence_rate: f64,
    pub with_column_lineage: usize,
    pub column_lineage_rate: f64,
}

/// One error type: messages sharing the text before their first `:`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorTypeEntry {
    pub error_type: String,
    pub count: usize,
    /// Identifier of the first outcome with this type
    pub example_query: String,
    /// First 200 characters of that outcome's message
    pub example_message: String,
}

/// Error messages grouped by type, most frequent first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ErrorBreakdown {
    pub error_count: usize,
    /// Fraction of all outcomes
    pub error_rate: f64,
    pub by_type: Vec<ErrorTypeEntry>,
}

/// Complete summary for one source, or for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AggregateSummary {
    /// Source path, or the run directory for run-wide summaries
    pub source: String,
    /// Aggregated flags of every member outcome
    pub flags: FlagSet,
    #[serde(flatten)]
    pub overview: Overview,
    pub timing_ms: TimingSummary,
    pub debug_info_error_counts: Vec<CountEntry>,
    pub statement_type_summary: BTreeMap<String, StatementTypeMetrics>,
    pub statement_type_flag_keys: Vec<Flag>,
    pub statement_type_error_classes: Vec<String>,
    pub confidence: ConfidenceBands,
    pub complexity: ComplexityBreakdown,
    pub validation: ValidationSummary,
    pub by_category: BTreeMap<String, GroupStats>,
    pub errors: ErrorBreakdown,
}
