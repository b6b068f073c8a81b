pub mod aggregate;
pub mod classify;
pub mod engine;
pub mod error;
pub mod features;
pub mod flags;
pub mod split;
pub mod types;
pub mod validation;

// Re-export main types and functions
pub use aggregate::{
    build_debug_error_summary, category_of, compute_overview, compute_statement_type_metrics,
    error_breakdown, error_type_of, group_by_source, normalize_error_label, percentile,
    summarize, timing_summary,
};
pub use classify::{infer_statement_type, normalize_statement_type_label, resolve_statement_type};
pub use engine::{
    annotate, evaluate_batch, evaluate_batch_with, evaluate_task, Expectations, LineageParser,
};
pub use error::{EngineError, TransportError, TransportErrorKind};
pub use features::{analyze_complexity, leading_tokens, strip_comments, DEFAULT_TOKEN_LIMIT};
pub use flags::{aggregate_flags, aggregate_outcome_flags, compute_flags};
pub use split::split_statements;
pub use validation::validate;

// Re-export types explicitly
pub use types::{
    AggregateSummary,
    BucketStats,
    ColumnLineageEdge,
    ColumnRef,
    ComplexityBreakdown,
    ComplexityBucket,
    ConfidenceBands,
    CountEntry,
    DebugInfo,
    ErrorBreakdown,
    ErrorTypeEntry,
    ExpectedLineage,
    Flag,
    FlagSet,
    GroupStats,
    Overview,
    ParseRequest,
    ParsedLineageResult,
    QueryComplexity,
    QueryOutcome,
    QueryTask,
    RunConfig,
    StatementTypeBreakdown,
    StatementTypeMetrics,
    StatementTypeSource,
    TaskOrigin,
    TimingSummary,
    ValidationResult,
    ValidationStatus,
    ValidationSummary,
};

// Test utilities (must be at end of file)
#[cfg(test)]
pub mod test_utils;
