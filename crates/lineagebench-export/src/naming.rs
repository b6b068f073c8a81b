use std::path::Path;

use chrono::{DateTime, TimeZone};
use lineagebench_core::{FlagSet, QueryOutcome};
use sha2::{Digest, Sha256};

/// File name of the structured report in each artifact folder.
pub const REPORT_JSON_NAME: &str = "[[]]report.json";
/// File name of the narrative report in each artifact folder.
pub const REPORT_MARKDOWN_NAME: &str = "[[]]report.md";

const MAX_COMPONENT_CHARS: usize = 128;
const DIGEST_CHARS: usize = 6;

/// Makes a label safe for use as a path component.
///
/// Alphanumerics and `-_.#` are kept, anything else becomes `_`; leading and
/// trailing underscores are stripped and the result is capped at 128
/// characters. An empty result becomes `result`.
pub fn sanitize_component(label: &str) -> String {
    let sanitized: String = label
        .chars()
        .map(|ch| {
            if ch.is_alphanumeric() || matches!(ch, '-' | '_' | '.' | '#') {
                ch
            } else {
                '_'
            }
        })
        .collect();
    let cleaned: String = sanitized
        .trim_matches('_')
        .chars()
        .take(MAX_COMPONENT_CHARS)
        .collect();
    if cleaned.is_empty() {
        "result".to_string()
    } else {
        cleaned
    }
}

/// First six hex characters of the SHA-256 of `text`.
pub fn short_digest(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let hex = format!("{:x}", hasher.finalize());
    hex[..DIGEST_CHARS].to_string()
}

/// Artifact folder for one source: `<flags><file name>--<digest>`.
pub fn source_folder_name(source_path: &Path, flags: &FlagSet) -> String {
    let full = source_path.display().to_string();
    let label = source_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| sanitize_component(&full));
    format!(
        "{}{}--{}",
        flags.prefix(),
        sanitize_component(&label),
        short_digest(&full)
    )
}

/// Per-statement artifact file: `<flags><identifier>--<digest>.json`.
pub fn query_filename(outcome: &QueryOutcome) -> String {
    let identifier = &outcome.task.identifier;
    format!(
        "{}{}--{}.json",
        outcome.flags.prefix(),
        sanitize_component(identifier),
        short_digest(identifier)
    )
}

/// Default run directory name, e.g. `20260118_123005`.
pub fn run_dir_name<Tz: TimeZone>(started_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    started_at.format("%Y%m%d_%H%M%S").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use lineagebench_core::{Flag, QueryTask};

    use super::*;

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("queries/load.sql:2"), "queries_load.sql_2");
        assert_eq!(sanitize_component("__a b__"), "a_b");
        assert_eq!(sanitize_component("#tmp.v1-x"), "#tmp.v1-x");
        assert_eq!(sanitize_component("///"), "result");
        assert_eq!(sanitize_component(&"x".repeat(300)).len(), 128);
    }

    #[test]
    fn test_short_digest() {
        // sha256("abc")
        assert_eq!(short_digest("abc"), "ba7816");
    }

    #[test]
    fn test_source_folder_name() {
        let flags: FlagSet = [Flag::Gap, Flag::Err].into_iter().collect();
        let name = source_folder_name(Path::new("etl/daily load.sql"), &flags);
        assert!(name.starts_with("[ERR][GAP]daily_load.sql--"));
        assert_eq!(name.len(), "[ERR][GAP]daily_load.sql--".len() + 6);
    }

    #[test]
    fn test_query_filename() {
        let mut outcome = QueryOutcome::from_transport_error(
            QueryTask::new("etl/load.sql:3", "SELECT 1", "etl/load.sql"),
            "boom",
            0.0,
        );
        outcome.flags = FlagSet::only(Flag::Err);
        let name = query_filename(&outcome);
        assert!(name.starts_with("[ERR]etl_load.sql_3--"));
        assert!(name.ends_with(".json"));
    }

    #[test]
    fn test_run_dir_name() {
        let started = Utc.with_ymd_and_hms(2026, 1, 18, 12, 30, 5).unwrap();
        assert_eq!(run_dir_name(&started), "20260118_123005");
    }
}
