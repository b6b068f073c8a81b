//! Expected-lineage loading.
//!
//! For a source `queries/load.sql` the expected record lives at
//! `<expected_dir>/load.json`. A JSON array holds one record per statement in
//! order; a single object applies only when the source has exactly one
//! statement. Unreadable or malformed files are logged and treated as absent,
//! as are records with no tables and no column edges.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use lineagebench_core::{ExpectedLineage, Expectations, QueryTask};
use serde_json::Value;
use tracing::{debug, warn};

/// Builds the identifier-keyed expectations for `tasks`.
pub fn load_expectations(expected_dir: &Path, tasks: &[QueryTask]) -> Expectations {
    let mut by_source: Vec<(&Path, Vec<&QueryTask>)> = Vec::new();
    let mut positions: HashMap<&Path, usize> = HashMap::new();
    for task in tasks {
        let source = task.source_path();
        let position = *positions.entry(source).or_insert_with(|| {
            by_source.push((source, Vec::new()));
            by_source.len() - 1
        });
        by_source[position].1.push(task);
    }

    let mut expectations = Expectations::new();
    for (source, source_tasks) in by_source {
        let Some(file) = expected_file(expected_dir, source) else {
            continue;
        };
        let Some(document) = read_document(&file) else {
            continue;
        };
        for (task, expected) in assign(&file, document, &source_tasks) {
            expectations.insert(task.identifier.clone(), expected);
        }
    }
    expectations
}

fn expected_file(expected_dir: &Path, source: &Path) -> Option<PathBuf> {
    let stem = source.file_stem()?;
    let mut name = stem.to_os_string();
    name.push(".json");
    let file = expected_dir.join(name);
    file.is_file().then_some(file)
}

fn read_document(file: &Path) -> Option<Value> {
    let text = match std::fs::read_to_string(file) {
        Ok(text) => text,
        Err(err) => {
            warn!(file = %file.display(), error = %err, "could not read expected lineage");
            return None;
        }
    };
    match serde_json::from_str(&text) {
        Ok(document) => Some(document),
        Err(err) => {
            warn!(file = %file.display(), error = %err, "malformed expected lineage");
            None
        }
    }
}

fn assign<'t>(
    file: &Path,
    document: Value,
    tasks: &[&'t QueryTask],
) -> Vec<(&'t QueryTask, ExpectedLineage)> {
    match document {
        Value::Array(records) => tasks
            .iter()
            .zip(records)
            .filter_map(|(task, record)| decode(file, record).map(|expected| (*task, expected)))
            .collect(),
        Value::Object(_) if tasks.len() == 1 => decode(file, document)
            .map(|expected| vec![(tasks[0], expected)])
            .unwrap_or_default(),
        Value::Object(_) => {
            debug!(
                file = %file.display(),
                statements = tasks.len(),
                "single expected record ignored for multi-statement source"
            );
            Vec::new()
        }
        _ => {
            warn!(file = %file.display(), "expected lineage must be an object or an array");
            Vec::new()
        }
    }
}

fn decode(file: &Path, record: Value) -> Option<ExpectedLineage> {
    if record.is_null() {
        return None;
    }
    match serde_json::from_value::<ExpectedLineage>(record) {
        Ok(expected) if expected.is_empty() => {
            debug!(file = %file.display(), "empty expected lineage record treated as absent");
            None
        }
        Ok(expected) => Some(expected),
        Err(err) => {
            warn!(file = %file.display(), error = %err, "malformed expected lineage record");
            None
        }
    }
}
