//! The lineage parser service's result contract.
//!
//! Every field is optional on the wire. Absent or `null` values decode to empty
//! collections, zero confidence or `None`, so downstream code never has to guess
//! whether a field exists.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::serde_utils::{deserialize_label, deserialize_null_default};

/// Lineage reported by the external parser for a single statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ParsedLineageResult {
    /// Upstream (read) table identifiers
    #[serde(deserialize_with = "deserialize_null_default")]
    pub in_tables: Vec<String>,

    /// Downstream (written) table identifiers
    #[serde(deserialize_with = "deserialize_null_default")]
    pub out_tables: Vec<String>,

    /// Column-level lineage edges
    #[serde(deserialize_with = "deserialize_null_default")]
    pub column_lineage: Vec<ColumnLineageEdge>,

    /// Parser diagnostics
    #[serde(deserialize_with = "deserialize_null_default")]
    pub debug_info: DebugInfo,

    /// Statement type as labelled by the parser, if it reported one
    #[serde(
        alias = "queryType",
        alias = "querytype",
        deserialize_with = "deserialize_label",
        skip_serializing_if = "Option::is_none"
    )]
    pub query_type: Option<String>,
}

impl ParsedLineageResult {
    /// The parser-reported error, ignoring blank messages.
    pub fn debug_error(&self) -> Option<&str> {
        self.debug_info
            .error
            .as_deref()
            .filter(|error| !error.trim().is_empty())
    }
}

/// Diagnostics attached to a parser result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DebugInfo {
    /// Parser confidence in `[0, 1]`
    #[serde(deserialize_with = "deserialize_null_default")]
    pub confidence: f64,

    /// Whether the parser failed to resolve tables
    #[serde(alias = "tableError", deserialize_with = "deserialize_null_default")]
    pub table_error: bool,

    /// Parse problem reported through the debug channel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A `{table, column}` reference. Either side may be missing in parser output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColumnRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
}

impl ColumnRef {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: Some(table.into()),
            column: Some(column.into()),
        }
    }

    /// `table.column`, only when both parts are present and non-empty.
    pub fn display_name(&self) -> Option<String> {
        match (self.table.as_deref(), self.column.as_deref()) {
            (Some(table), Some(column)) if !table.is_empty() && !column.is_empty() => {
                Some(format!("{table}.{column}"))
            }
            _ => None,
        }
    }

    /// `table:column` key used when comparing against expected lineage.
    /// Missing parts become empty strings.
    pub fn comparison_key(&self) -> String {
        format!(
            "{}:{}",
            self.table.as_deref().unwrap_or_default(),
            self.column.as_deref().unwrap_or_default()
        )
    }
}

/// A directed column-lineage edge: one or more upstream columns feeding one downstream column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ColumnLineageEdge {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downstream: Option<ColumnRef>,

    #[serde(deserialize_with = "deserialize_null_default")]
    pub upstreams: Vec<ColumnRef>,

    /// Free-text transform logic
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logic: Option<String>,
}

impl ColumnLineageEdge {
    pub fn new(downstream: ColumnRef, upstreams: Vec<ColumnRef>) -> Self {
        Self {
            downstream: Some(downstream),
            upstreams,
            logic: None,
        }
    }

    /// Directed `(upstream, downstream)` comparison pairs, one per upstream entry.
    /// Edges without a downstream column produce no pairs.
    pub fn comparison_pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        let downstream = self.downstream.as_ref().map(ColumnRef::comparison_key);
        self.upstreams.iter().filter_map(move |upstream| {
            downstream
                .as_ref()
                .map(|down| (upstream.comparison_key(), down.clone()))
        })
    }

    /// Like [`comparison_pairs`](Self::comparison_pairs), but a missing
    /// downstream column is keyed as `:`. Used for expected lineage, where such
    /// edges still count against recall.
    pub fn expected_comparison_pairs(&self) -> impl Iterator<Item = (String, String)> + '_ {
        let downstream = self
            .downstream
            .as_ref()
            .map(ColumnRef::comparison_key)
            .unwrap_or_else(|| ColumnRef::default().comparison_key());
        self.upstreams
            .iter()
            .map(move |upstream| (upstream.comparison_key(), downstream.clone()))
    }

    /// Display strings `up.col -> down.col` for fully-specified upstream/downstream pairs.
    pub fn display_edges(&self) -> Vec<String> {
        let Some(downstream) = self.downstream.as_ref().and_then(ColumnRef::display_name) else {
            return Vec::new();
        };
        self.upstreams
            .iter()
            .filter_map(ColumnRef::display_name)
            .map(|upstream| format!("{upstream} -> {downstream}"))
            .collect()
    }
}
