//! Per-statement evaluation outcome.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{Flag, FlagSet, StatementTypeSource};
use super::parsed::ParsedLineageResult;
use super::request::QueryTask;
use super::validation::{ValidationResult, ValidationStatus};

/// Lexical complexity metrics, computed once from the raw statement text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QueryComplexity {
    pub cte_count: usize,
    /// Approximate; derived from parenthesis depth
    pub max_cte_depth: usize,
    pub subquery_count: usize,
    pub join_count: usize,
    pub union_count: usize,
    pub window_function_count: usize,
    pub line_count: usize,
    pub char_count: usize,
}

/// Everything known about one statement after it has been sent to the parser.
///
/// Built by [`crate::evaluate_task`]; flags, statement type and validation are
/// filled in before the outcome is handed to the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QueryOutcome {
    pub task: QueryTask,

    /// Parser result; `None` when the transport call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ParsedLineageResult>,

    pub upstreams: Vec<String>,
    pub downstreams: Vec<String>,

    /// `up_table.up_col -> down_table.down_col`
    pub column_edges: Vec<String>,

    pub timing_ms: f64,

    /// Error reported through the parser's debug channel
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser_error: Option<String>,

    /// Transport failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_error: Option<String>,

    pub self_referential: bool,
    pub flags: FlagSet,
    pub statement_type: String,
    pub statement_type_source: StatementTypeSource,

    /// Normalized label reported by the parser, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parser_statement_type: Option<String>,

    pub complexity: QueryComplexity,
    pub validation_status: ValidationStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationResult>,
}

impl QueryOutcome {
    /// Outcome for a statement whose parser call returned a result.
    pub fn from_result(task: QueryTask, result: ParsedLineageResult, timing_ms: f64) -> Self {
        let upstreams = result.in_tables.clone();
        let downstreams = result.out_tables.clone();
        let column_edges = result
            .column_lineage
            .iter()
            .flat_map(|edge| edge.display_edges())
            .collect();
        let self_referential = downstreams
            .iter()
            .any(|downstream| upstreams.contains(downstream));
        let parser_error = result.debug_error().map(str::to_string);

        Self {
            task,
            upstreams,
            downstreams,
            column_edges,
            timing_ms,
            parser_error,
            rpc_error: None,
            self_referential,
            result: Some(result),
            ..Self::blank()
        }
    }

    /// Outcome for a statement whose parser call failed.
    pub fn from_transport_error(task: QueryTask, error: impl Into<String>, timing_ms: f64) -> Self {
        Self {
            task,
            timing_ms,
            rpc_error: Some(error.into()),
            ..Self::blank()
        }
    }

    fn blank() -> Self {
        Self {
            task: QueryTask::new("", "", ""),
            result: None,
            upstreams: Vec::new(),
            downstreams: Vec::new(),
            column_edges: Vec::new(),
            timing_ms: 0.0,
            parser_error: None,
            rpc_error: None,
            self_referential: false,
            flags: FlagSet::new(),
            statement_type: "UNKNOWN".to_string(),
            statement_type_source: StatementTypeSource::Unknown,
            parser_statement_type: None,
            complexity: QueryComplexity::default(),
            validation_status: ValidationStatus::NoExpected,
            validation: None,
        }
    }

    /// True when neither a parser error nor a transport error was recorded.
    pub fn succeeded(&self) -> bool {
        self.parser_error.is_none() && self.rpc_error.is_none()
    }

    pub fn has_flag(&self, flag: Flag) -> bool {
        self.flags.contains(flag)
    }

    pub fn confidence(&self) -> f64 {
        self.result
            .as_ref()
            .map_or(0.0, |result| result.debug_info.confidence)
    }

    pub fn table_error(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|result| result.debug_info.table_error)
    }

    /// Number of raw column-lineage entries in the parser result.
    pub fn column_lineage_count(&self) -> usize {
        self.result
            .as_ref()
            .map_or(0, |result| result.column_lineage.len())
    }

    /// Debug-channel error as it appears in the raw payload.
    pub fn debug_info_error(&self) -> Option<&str> {
        self.result.as_ref().and_then(ParsedLineageResult::debug_error)
    }

    /// Either error message, transport first.
    pub fn error_message(&self) -> Option<&str> {
        self.rpc_error.as_deref().or(self.parser_error.as_deref())
    }

    /// The parser result as JSON with a `debugInfoError` key, or
    /// `{"error", "query"}` when the call failed.
    pub fn raw_payload(&self) -> Value {
        match &self.result {
            Some(result) => {
                let mut payload = serde_json::to_value(result).unwrap_or(Value::Null);
                if let Value::Object(map) = &mut payload {
                    map.insert(
                        "debugInfoError".to_string(),
                        self.debug_info_error()
                            .map_or(Value::Null, |error| Value::String(error.to_string())),
                    );
                }
                payload
            }
            None => serde_json::json!({
                "error": self.rpc_error.as_deref().unwrap_or_default(),
                "query": self.task.query_text,
            }),
        }
    }
}
