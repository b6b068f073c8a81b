//! Per-statement evaluation pipeline.
//!
//! Each task is sent to the lineage parser, then classified, scored, flagged
//! and (when an expected record exists) validated before the next task starts.

use std::collections::HashMap;
use std::time::Instant;
#[cfg(feature = "tracing")]
use tracing::{debug, info, warn};

use crate::classify::{normalize_statement_type_label, resolve_statement_type};
use crate::error::{EngineError, TransportError};
use crate::features::analyze_complexity;
use crate::flags::compute_flags;
use crate::types::{
    ExpectedLineage, ParseRequest, ParsedLineageResult, QueryOutcome, QueryTask, RunConfig,
    ValidationStatus,
};
use crate::validation::validate;

/// The external SQL-to-lineage service.
///
/// Implementations perform one blocking call per statement. Any closure with
/// the same signature is a parser, which keeps tests free of network access.
pub trait LineageParser {
    fn parse(&self, request: &ParseRequest<'_>) -> Result<ParsedLineageResult, TransportError>;
}

impl<F> LineageParser for F
where
    F: Fn(&ParseRequest<'_>) -> Result<ParsedLineageResult, TransportError>,
{
    fn parse(&self, request: &ParseRequest<'_>) -> Result<ParsedLineageResult, TransportError> {
        self(request)
    }
}

/// Expected lineage keyed by task identifier.
pub type Expectations = HashMap<String, ExpectedLineage>;

/// Evaluates one statement end to end.
///
/// Transport failures are recorded on the outcome, never returned.
pub fn evaluate_task<P>(
    parser: &P,
    config: &RunConfig,
    task: QueryTask,
    expected: Option<&ExpectedLineage>,
) -> QueryOutcome
where
    P: LineageParser + ?Sized,
{
    let started = Instant::now();
    let response = parser.parse(&config.request(&task.query_text));
    let timing_ms = started.elapsed().as_secs_f64() * 1000.0;

    let outcome = match response {
        Ok(result) => QueryOutcome::from_result(task, result, timing_ms),
        Err(err) => {
            #[cfg(feature = "tracing")]
            warn!(identifier = %task.identifier, error = %err, "lineage parser call failed");
            QueryOutcome::from_transport_error(task, err.to_string(), timing_ms)
        }
    };
    annotate(outcome, expected)
}

/// Fills in the derived fields of a freshly built outcome: statement type,
/// complexity, flags and validation.
pub fn annotate(mut outcome: QueryOutcome, expected: Option<&ExpectedLineage>) -> QueryOutcome {
    let raw_label = outcome
        .result
        .as_ref()
        .and_then(|result| result.query_type.as_deref());
    outcome.parser_statement_type = raw_label.and_then(normalize_statement_type_label);

    let (statement_type, source) =
        resolve_statement_type(raw_label, &outcome.task.query_text);
    outcome.statement_type = statement_type;
    outcome.statement_type_source = source;
    outcome.complexity = analyze_complexity(&outcome.task.query_text);
    outcome.flags = compute_flags(&outcome);

    // Only parser output is validated; transport failures and empty records are `no_expected`.
    let expected = expected.filter(|expected| !expected.is_empty());
    match (expected, outcome.result.as_ref()) {
        (Some(expected), Some(actual)) => {
            let validation = validate(actual, expected);
            outcome.validation_status = validation.status();
            outcome.validation = Some(validation);
        }
        _ => {
            outcome.validation_status = ValidationStatus::NoExpected;
            outcome.validation = None;
        }
    }

    #[cfg(feature = "tracing")]
    debug!(
        identifier = %outcome.task.identifier,
        statement_type = %outcome.statement_type,
        flags = %outcome.flags,
        timing_ms = outcome.timing_ms,
        "statement evaluated"
    );
    outcome
}

/// Evaluates every task in input order.
pub fn evaluate_batch<P>(
    parser: &P,
    config: &RunConfig,
    tasks: Vec<QueryTask>,
    expectations: &Expectations,
) -> Result<Vec<QueryOutcome>, EngineError>
where
    P: LineageParser + ?Sized,
{
    evaluate_batch_with(parser, config, tasks, expectations, |_, _, _| {})
}

/// Like [`evaluate_batch`], calling `observer(index, total, outcome)` after
/// each statement. `index` is one-based.
///
/// # Errors
///
/// Returns [`EngineError::EmptyBatch`] when there is nothing to evaluate.
pub fn evaluate_batch_with<P, F>(
    parser: &P,
    config: &RunConfig,
    tasks: Vec<QueryTask>,
    expectations: &Expectations,
    mut observer: F,
) -> Result<Vec<QueryOutcome>, EngineError>
where
    P: LineageParser + ?Sized,
    F: FnMut(usize, usize, &QueryOutcome),
{
    if tasks.is_empty() {
        return Err(EngineError::EmptyBatch);
    }

    let total = tasks.len();
    #[cfg(feature = "tracing")]
    info!(total, platform = %config.platform, "evaluating statements");

    let mut outcomes = Vec::with_capacity(total);
    for (index, task) in tasks.into_iter().enumerate() {
        let expected = expectations.get(&task.identifier);
        let outcome = evaluate_task(parser, config, task, expected);
        observer(index + 1, total, &outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}
