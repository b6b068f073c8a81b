//! Input types: the statements to evaluate and the run configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where a task's SQL text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TaskOrigin {
    File,
    Csv,
    Stdin,
}

/// One SQL statement to send to the lineage parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryTask {
    /// Unique identifier, e.g. `queries/load.sql:2`
    pub identifier: String,

    /// The statement text
    pub query_text: String,

    /// Kind of input the statement was read from
    pub origin: TaskOrigin,

    /// Human-readable description of where the statement lives
    pub context: String,

    /// File the statement was read from
    pub source_path: PathBuf,

    /// One-based position of the statement within its source
    pub statement_index: usize,
}

impl QueryTask {
    pub fn new(
        identifier: impl Into<String>,
        query_text: impl Into<String>,
        source_path: impl Into<PathBuf>,
    ) -> Self {
        let identifier = identifier.into();
        Self {
            context: identifier.clone(),
            identifier,
            query_text: query_text.into(),
            origin: TaskOrigin::File,
            source_path: source_path.into(),
            statement_index: 1,
        }
    }

    pub fn with_origin(mut self, origin: TaskOrigin) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    pub fn with_statement_index(mut self, index: usize) -> Self {
        self.statement_index = index;
        self
    }

    /// Label used in previews: the source path, or the identifier when the path is empty.
    pub fn source_label(&self) -> String {
        if self.source_path.as_os_str().is_empty() {
            self.identifier.clone()
        } else {
            self.source_path.display().to_string()
        }
    }

    /// Indented preview of the statement, headed by its source label.
    pub fn preview_lines(&self) -> Vec<String> {
        self.preview_lines_limited(None)
    }

    pub fn preview_lines_limited(&self, max_lines: Option<usize>) -> Vec<String> {
        let mut formatted = vec![format!("{} ::", self.source_label())];
        let lines = self
            .query_text
            .trim()
            .lines()
            .map(str::trim_end)
            .take(max_lines.unwrap_or(usize::MAX));

        let before = formatted.len();
        for line in lines {
            if line.is_empty() {
                formatted.push("    ".to_string());
            } else {
                formatted.push(format!("    {line}"));
            }
        }
        if formatted.len() == before {
            formatted.push("    <empty>".to_string());
        }
        formatted
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

/// Settings forwarded to the lineage parser for every statement in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Dataset platform, e.g. `teradata`
    pub platform: String,
    /// Dataset environment, e.g. `PROD`
    pub env: String,
    /// SQL dialect hint
    pub dialect: Option<String>,
    pub default_db: Option<String>,
    pub default_schema: Option<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            platform: "teradata".to_string(),
            env: "PROD".to_string(),
            dialect: Some("teradata".to_string()),
            default_db: None,
            default_schema: None,
        }
    }
}

impl RunConfig {
    /// Build the parser request for one statement.
    pub fn request<'a>(&'a self, sql: &'a str) -> ParseRequest<'a> {
        ParseRequest {
            sql,
            platform: &self.platform,
            env: &self.env,
            dialect: self.dialect.as_deref(),
            default_db: self.default_db.as_deref(),
            default_schema: self.default_schema.as_deref(),
        }
    }
}

/// A single call to the lineage parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseRequest<'a> {
    pub sql: &'a str,
    pub platform: &'a str,
    pub env: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dialect: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_db: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_schema: Option<&'a str>,
}
