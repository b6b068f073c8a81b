use lineagebench_core::{QueryComplexity, QueryOutcome, ValidationResult, ValidationStatus};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Flat per-statement result, one row of the results CSV or one element of
/// the results JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ResultRecord {
    pub query_id: String,
    pub query_file: String,
    pub statement_index: usize,
    pub statement_type: String,
    pub dialect: String,
    pub success: bool,
    pub confidence: f64,
    pub parse_time_ms: f64,
    pub in_tables: Vec<String>,
    pub out_tables: Vec<String>,
    pub column_lineage_count: usize,
    pub error_message: Option<String>,
    pub table_error: bool,
    pub complexity: QueryComplexity,
    pub validation_status: ValidationStatus,
    pub validation_details: Option<ValidationResult>,
}

impl ResultRecord {
    pub fn from_outcome(outcome: &QueryOutcome, dialect: Option<&str>) -> Self {
        let (in_tables, out_tables) = outcome
            .result
            .as_ref()
            .map(|result| (result.in_tables.clone(), result.out_tables.clone()))
            .unwrap_or_default();

        Self {
            query_id: outcome.task.identifier.clone(),
            query_file: outcome.task.source_path.display().to_string(),
            statement_index: outcome.task.statement_index,
            statement_type: outcome.statement_type.clone(),
            dialect: dialect.unwrap_or_default().to_string(),
            success: outcome.succeeded(),
            confidence: outcome.confidence(),
            parse_time_ms: outcome.timing_ms,
            in_tables,
            out_tables,
            column_lineage_count: outcome.column_lineage_count(),
            error_message: outcome.error_message().map(str::to_string),
            table_error: outcome.table_error(),
            complexity: outcome.complexity,
            validation_status: outcome.validation_status,
            validation_details: outcome.validation.clone(),
        }
    }
}

/// Builds records for every outcome, preserving order.
pub fn build_result_records(outcomes: &[QueryOutcome], dialect: Option<&str>) -> Vec<ResultRecord> {
    outcomes
        .iter()
        .map(|outcome| ResultRecord::from_outcome(outcome, dialect))
        .collect()
}
