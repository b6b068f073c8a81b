//! Expected lineage records and the result of comparing against them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::parsed::ColumnLineageEdge;
use super::serde_utils::deserialize_null_default;

/// Ground-truth lineage for one statement, loaded from an expected-results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ExpectedLineage {
    #[serde(deserialize_with = "deserialize_null_default")]
    pub in_tables: Vec<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub out_tables: Vec<String>,
    #[serde(deserialize_with = "deserialize_null_default")]
    pub column_lineage: Vec<ColumnLineageEdge>,
}

impl ExpectedLineage {
    /// No tables and no column edges. An empty record counts as absent.
    pub fn is_empty(&self) -> bool {
        self.in_tables.is_empty() && self.out_tables.is_empty() && self.column_lineage.is_empty()
    }
}

/// Outcome of validating a statement against its expected lineage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Passed,
    Failed,
    #[default]
    NoExpected,
}

impl ValidationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::NoExpected => "no_expected",
        }
    }

    pub fn is_validated(self) -> bool {
        !matches!(self, Self::NoExpected)
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precision/recall comparison at table and column granularity.
///
/// Metrics for a granularity stay at their defaults (`false` / `0.0` / empty)
/// when the expected record has nothing at that granularity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub tables_match: bool,
    pub columns_match: bool,
    pub tables_precision: f64,
    pub tables_recall: f64,
    pub columns_precision: f64,
    pub columns_recall: f64,
    pub missing_tables: Vec<String>,
    pub extra_tables: Vec<String>,
    /// `up_table:up_col->down_table:down_col`
    pub missing_columns: Vec<String>,
    pub extra_columns: Vec<String>,
}

impl ValidationResult {
    pub fn status(&self) -> ValidationStatus {
        if self.tables_match && self.columns_match {
            ValidationStatus::Passed
        } else {
            ValidationStatus::Failed
        }
    }
}
