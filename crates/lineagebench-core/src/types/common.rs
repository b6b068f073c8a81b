//! Flag and provenance types shared by outcomes and summaries.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Quality flag attached to an outcome.
///
/// Variant order is the display precedence: `ERR, GAP, LIN, SELF, COL, OK`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub enum Flag {
    /// The parser reported an error or the call failed
    #[serde(rename = "ERR")]
    Err,
    /// Only one side of the table lineage was found
    #[serde(rename = "GAP")]
    Gap,
    /// Both upstream and downstream tables were found
    #[serde(rename = "LIN")]
    Lin,
    /// A downstream table is also an upstream table
    #[serde(rename = "SELF")]
    SelfRef,
    /// Column-level lineage is present
    #[serde(rename = "COL")]
    Col,
    /// Nothing else fired and the call succeeded
    #[serde(rename = "OK")]
    Ok,
}

impl Flag {
    pub const ALL: [Flag; 6] = [
        Flag::Err,
        Flag::Gap,
        Flag::Lin,
        Flag::SelfRef,
        Flag::Col,
        Flag::Ok,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Flag::Err => "ERR",
            Flag::Gap => "GAP",
            Flag::Lin => "LIN",
            Flag::SelfRef => "SELF",
            Flag::Col => "COL",
            Flag::Ok => "OK",
        }
    }

    /// One-line meaning, used in report legends.
    pub fn description(self) -> &'static str {
        match self {
            Flag::Err => "parser reported an error or the request failed",
            Flag::Gap => "only one side of the table lineage was found",
            Flag::Lin => "upstream and downstream tables were both found",
            Flag::SelfRef => "a target table is also read as a source",
            Flag::Col => "column-level lineage is present",
            Flag::Ok => "no other flag applied and the request succeeded",
        }
    }
}

impl fmt::Display for Flag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered set of flags. Iteration follows display precedence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct FlagSet(BTreeSet<Flag>);

impl FlagSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn only(flag: Flag) -> Self {
        Self(BTreeSet::from([flag]))
    }

    pub fn insert(&mut self, flag: Flag) -> bool {
        self.0.insert(flag)
    }

    pub fn remove(&mut self, flag: Flag) -> bool {
        self.0.remove(&flag)
    }

    pub fn contains(&self, flag: Flag) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Flag> + '_ {
        self.0.iter().copied()
    }

    /// Bracketed prefix such as `[ERR][GAP]`.
    pub fn prefix(&self) -> String {
        self.iter().map(|flag| format!("[{flag}]")).collect()
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix())
    }
}

impl FromIterator<Flag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = Flag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<Flag> for FlagSet {
    fn extend<I: IntoIterator<Item = Flag>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl<'a> IntoIterator for &'a FlagSet {
    type Item = Flag;
    type IntoIter = std::iter::Copied<std::collections::btree_set::Iter<'a, Flag>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

/// Where a statement-type label came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum StatementTypeSource {
    /// Label reported by the lineage parser
    Parser,
    /// Label inferred from leading keywords
    Fallback,
    /// Never classified
    #[default]
    Unknown,
}

impl StatementTypeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Parser => "parser",
            Self::Fallback => "fallback",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for StatementTypeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
