//! Data model for lineage parser evaluation.
//!
//! Tasks go in, the external parser's [`ParsedLineageResult`] comes back, and
//! each statement ends up as a [`QueryOutcome`]. Outcomes are folded into an
//! [`AggregateSummary`] per source and for the whole run.

mod common;
mod outcome;
mod parsed;
mod request;
mod serde_utils;
mod summary;
mod validation;

pub use common::{Flag, FlagSet, StatementTypeSource};
pub use outcome::{QueryComplexity, QueryOutcome};
pub use parsed::{ColumnLineageEdge, ColumnRef, DebugInfo, ParsedLineageResult};
pub use request::{ParseRequest, QueryTask, RunConfig, TaskOrigin};
pub use summary::{
    AggregateSummary, BucketStats, ComplexityBreakdown, ComplexityBucket, ConfidenceBands,
    CountEntry, ErrorBreakdown, ErrorTypeEntry, GroupStats, Overview, StatementTypeBreakdown, StatementTypeMetrics,
    TimingSummary, ValidationSummary,
};
pub use validation::{ExpectedLineage, ValidationResult, ValidationStatus};
