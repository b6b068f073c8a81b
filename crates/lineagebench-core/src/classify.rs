//! Statement-type classification.
//!
//! The parser's own label wins when it says something useful. Otherwise a
//! keyword table over the leading tokens decides.

use regex::Regex;
use std::sync::OnceLock;
#[cfg(feature = "tracing")]
use tracing::debug;

use crate::features::{leading_tokens, DEFAULT_TOKEN_LIMIT};
use crate::types::StatementTypeSource;

/// Label used when no classification is possible.
pub const UNKNOWN_STATEMENT_TYPE: &str = "UNKNOWN";

/// Normalizes a parser-reported statement type label.
///
/// Keeps the part after the final `.` (enum-style labels such as
/// `QueryType.CREATE_VIEW`), replaces `/`, `-` and whitespace runs with `_`,
/// and upper-cases. Returns `None` for blank input.
pub fn normalize_statement_type_label(label: &str) -> Option<String> {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let whitespace = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("Invalid regex pattern"));

    let text = label.trim();
    let text = text.rsplit('.').next().unwrap_or(text);
    let text = text.replace(['/', '-'], "_");
    let text = whitespace.replace_all(&text, "_").to_uppercase();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Infers a statement type from the leading keyword tokens.
pub fn infer_statement_type(sql: &str) -> String {
    let tokens = leading_tokens(sql, DEFAULT_TOKEN_LIMIT);
    classify_tokens(&tokens)
}

fn classify_tokens(tokens: &[String]) -> String {
    let Some(first) = tokens.first().map(String::as_str) else {
        return UNKNOWN_STATEMENT_TYPE.to_string();
    };
    let second = tokens.get(1).map(String::as_str).unwrap_or_default();
    let third = tokens.get(2).map(String::as_str).unwrap_or_default();
    let set_table = matches!(second, "SET" | "MULTISET") && third == "TABLE";

    let label = match first {
        "SEL" => "SELECT",
        "WITH" => tokens[1..]
            .iter()
            .map(String::as_str)
            .find(|token| matches!(*token, "SELECT" | "INSERT" | "UPDATE" | "DELETE" | "MERGE"))
            .unwrap_or("SELECT"),
        "BT" | "ET" | "DATABASE" | "USING" | "LOCKING" => first,
        "CALL" | "EXEC" | "EXECUTE" => "CALL",
        "COLLECT" if second == "STATISTICS" => "COLLECT_STATISTICS",
        "REPLACE" if matches!(second, "PROCEDURE" | "FUNCTION" | "TABLE" | "VIEW" | "MACRO") => {
            return format!("REPLACE_{second}");
        }
        "REPLACE" if set_table => "REPLACE_TABLE",
        "CREATE" if set_table || second == "TABLE" => "CREATE_TABLE",
        "CREATE" if matches!(second, "VIEW" | "DATABASE" | "PROCEDURE" | "MACRO" | "FUNCTION") => {
            return format!("CREATE_{second}");
        }
        "ALTER" if matches!(second, "TABLE" | "DATABASE" | "PROCEDURE" | "FUNCTION") => {
            return format!("ALTER_{second}");
        }
        "DROP"
            if matches!(
                second,
                "TABLE" | "DATABASE" | "VIEW" | "PROCEDURE" | "MACRO" | "FUNCTION"
            ) =>
        {
            return format!("DROP_{second}");
        }
        "INSERT" | "UPDATE" | "DELETE" | "MERGE" | "SELECT" => first,
        "GRANT" | "REVOKE" | "LOGON" | "LOGOFF" => first,
        "BEGIN" if second == "TRANSACTION" => "BEGIN_TRANSACTION",
        _ => first,
    };
    label.to_string()
}

/// Resolves the final statement type and where it came from.
///
/// A parser label that normalizes to something other than `UNKNOWN` wins.
/// Otherwise the keyword fallback runs, and its answer (even `UNKNOWN`) is
/// attributed to the fallback.
pub fn resolve_statement_type(
    parser_label: Option<&str>,
    sql: &str,
) -> (String, StatementTypeSource) {
    if let Some(normalized) = parser_label.and_then(normalize_statement_type_label) {
        if normalized != UNKNOWN_STATEMENT_TYPE {
            return (normalized, StatementTypeSource::Parser);
        }
    }

    let inferred = infer_statement_type(sql);
    #[cfg(feature = "tracing")]
    debug!(
        parser_label = ?parser_label,
        inferred = %inferred,
        "statement type resolved by keyword fallback"
    );
    (inferred, StatementTypeSource::Fallback)
}
