use std::collections::HashMap;

use lineagebench_core::{
    ColumnLineageEdge, ColumnRef, DebugInfo, ParseRequest, ParsedLineageResult, QueryTask,
    TransportError,
};

/// A canned lineage parser: answers by exact SQL text, fails for unknown SQL.
#[derive(Default)]
pub struct StubParser {
    responses: HashMap<String, ParsedLineageResult>,
}

impl StubParser {
    pub fn with(mut self, sql: &str, result: ParsedLineageResult) -> Self {
        self.responses.insert(sql.to_string(), result);
        self
    }
}

impl lineagebench_core::LineageParser for StubParser {
    fn parse(&self, request: &ParseRequest<'_>) -> Result<ParsedLineageResult, TransportError> {
        self.responses
            .get(request.sql)
            .cloned()
            .ok_or_else(|| TransportError::with_status("no canned response", 503))
    }
}

pub fn lineage(in_tables: &[&str], out_tables: &[&str]) -> ParsedLineageResult {
    ParsedLineageResult {
        in_tables: in_tables.iter().map(|t| t.to_string()).collect(),
        out_tables: out_tables.iter().map(|t| t.to_string()).collect(),
        debug_info: DebugInfo {
            confidence: 0.9,
            ..Default::default()
        },
        ..Default::default()
    }
}

pub fn edge(up: (&str, &str), down: (&str, &str)) -> ColumnLineageEdge {
    ColumnLineageEdge::new(
        ColumnRef::new(down.0, down.1),
        vec![ColumnRef::new(up.0, up.1)],
    )
}

pub fn tasks(source: &str, statements: &[&str]) -> Vec<QueryTask> {
    statements
        .iter()
        .enumerate()
        .map(|(idx, sql)| {
            QueryTask::new(format!("{source}:{}", idx + 1), *sql, source)
                .with_statement_index(idx + 1)
        })
        .collect()
}
