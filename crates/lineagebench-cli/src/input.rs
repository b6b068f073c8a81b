//! Input discovery: SQL files, directories, CSV columns and stdin.
//!
//! Every source is split into statements and each statement becomes one
//! [`QueryTask`]. Task order is the order the sources were given on the
//! command line; directory contents are sorted by path.

use anyhow::{bail, Context, Result};
use lineagebench_core::{split_statements, QueryTask, TaskOrigin};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::Args;

/// Path argument that reads SQL from stdin.
pub const STDIN_MARKER: &str = "-";
const STDIN_LABEL: &str = "<stdin>";

/// Collects tasks from every input source named in `args`.
pub fn collect_tasks(args: &Args) -> Result<Vec<QueryTask>> {
    let dialect = Some(args.dialect.as_str()).filter(|dialect| !dialect.is_empty());
    let delimiter = csv_delimiter(args.csv_delimiter)?;
    let mut tasks = Vec::new();

    for path in &args.sql_files {
        if path.as_os_str() == STDIN_MARKER {
            tasks.extend(read_stdin(dialect)?);
        } else if path.is_dir() {
            tasks.extend(load_directory(path, dialect)?);
        } else if path.exists() {
            tasks.extend(load_file(path, dialect)?);
        } else {
            bail!("SQL file not found: {}", path.display());
        }
    }

    for path in &args.sql_dirs {
        if !path.is_dir() {
            bail!("SQL directory not found: {}", path.display());
        }
        tasks.extend(load_directory(path, dialect)?);
    }

    for spec in &args.csv_specs {
        let (path, column) = parse_csv_spec(spec)?;
        tasks.extend(load_csv(&path, column, delimiter, dialect)?);
    }

    if !args.csv_dirs.is_empty() {
        let Some(column) = args.csv_dir_column.as_deref() else {
            bail!("--csv-dir-column is required when using --csv-dir");
        };
        for dir in &args.csv_dirs {
            if !dir.is_dir() {
                bail!("CSV directory not found: {}", dir.display());
            }
            for path in files_with_extension(dir, "csv") {
                tasks.extend(load_csv(&path, column, delimiter, dialect)?);
            }
        }
    }

    Ok(tasks)
}

/// Splits `PATH:COLUMN` at the last colon.
pub fn parse_csv_spec(spec: &str) -> Result<(PathBuf, &str)> {
    match spec.rsplit_once(':') {
        Some((path, column)) if !path.is_empty() && !column.is_empty() => {
            Ok((PathBuf::from(path), column))
        }
        _ => bail!("CSV spec must be in the form PATH:COLUMN (e.g. queries.csv:sql_text), got '{spec}'"),
    }
}

fn csv_delimiter(delimiter: char) -> Result<u8> {
    if !delimiter.is_ascii() {
        bail!("CSV delimiter must be a single ASCII character, got '{delimiter}'");
    }
    Ok(delimiter as u8)
}

/// Loads every statement of one SQL file as `<path>:<n>`.
pub fn load_file(path: &Path, dialect: Option<&str>) -> Result<Vec<QueryTask>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let label = path.display().to_string();

    Ok(split_statements(&text, dialect)
        .into_iter()
        .enumerate()
        .map(|(offset, statement)| {
            let index = offset + 1;
            QueryTask::new(format!("{label}:{index}"), statement, path)
                .with_context(format!("{label} (statement {index})"))
                .with_statement_index(index)
        })
        .collect())
}

fn load_directory(dir: &Path, dialect: Option<&str>) -> Result<Vec<QueryTask>> {
    let mut tasks = Vec::new();
    for path in files_with_extension(dir, "sql") {
        tasks.extend(load_file(&path, dialect)?);
    }
    Ok(tasks)
}

fn files_with_extension(dir: &Path, extension: &str) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
        })
        .collect();
    paths.sort();
    paths
}

/// Loads statements from one CSV column as `<path>:row<r>:stmt<s>`.
///
/// Row numbers count the header as row 1. Blank cells are skipped.
pub fn load_csv(
    path: &Path,
    column: &str,
    delimiter: u8,
    dialect: Option<&str>,
) -> Result<Vec<QueryTask>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read CSV header: {}", path.display()))?
        .clone();
    let Some(position) = headers.iter().position(|header| header == column) else {
        let available: Vec<&str> = headers.iter().collect();
        bail!(
            "Column '{column}' not found in {}. Available columns: {}",
            path.display(),
            available.join(", ")
        );
    };

    let label = path.display().to_string();
    let mut tasks = Vec::new();
    for (offset, record) in reader.records().enumerate() {
        let row = offset + 2;
        let record =
            record.with_context(|| format!("Failed to read row {row} of {}", path.display()))?;
        let cell = record.get(position).unwrap_or_default().trim();
        if cell.is_empty() {
            continue;
        }
        for (stmt_offset, statement) in split_statements(cell, dialect).into_iter().enumerate() {
            let stmt = stmt_offset + 1;
            tasks.push(
                QueryTask::new(format!("{label}:row{row}:stmt{stmt}"), statement, path)
                    .with_origin(TaskOrigin::Csv)
                    .with_context(format!(
                        "{label} row {row} column '{column}' (statement {stmt})"
                    ))
                    .with_statement_index(stmt),
            );
        }
    }
    Ok(tasks)
}

fn read_stdin(dialect: Option<&str>) -> Result<Vec<QueryTask>> {
    let mut content = String::new();
    io::stdin()
        .read_to_string(&mut content)
        .context("Failed to read from stdin")?;
    Ok(stdin_tasks(&content, dialect))
}

fn stdin_tasks(content: &str, dialect: Option<&str>) -> Vec<QueryTask> {
    split_statements(content, dialect)
        .into_iter()
        .enumerate()
        .map(|(offset, statement)| {
            let index = offset + 1;
            QueryTask::new(format!("{STDIN_LABEL}:{index}"), statement, STDIN_LABEL)
                .with_origin(TaskOrigin::Stdin)
                .with_context(format!("{STDIN_LABEL} (statement {index})"))
                .with_statement_index(index)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_load_file_splits_statements() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("load.sql");
        fs::write(&path, "INSERT INTO b SELECT * FROM a;\n\nSELECT ';' FROM c;\n").unwrap();

        let tasks = load_file(&path, Some("generic")).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].identifier, format!("{}:1", path.display()));
        assert_eq!(tasks[1].query_text, "SELECT ';' FROM c");
        assert_eq!(tasks[1].statement_index, 2);
        assert_eq!(tasks[1].origin, TaskOrigin::File);
        assert_eq!(tasks[1].context, format!("{} (statement 2)", path.display()));
    }

    #[test]
    fn test_directory_is_sorted_and_recursive() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.sql"), "SELECT 2").unwrap();
        fs::write(dir.path().join("a.sql"), "SELECT 1").unwrap();
        fs::write(dir.path().join("nested/c.sql"), "SELECT 3").unwrap();
        fs::write(dir.path().join("notes.txt"), "SELECT 4").unwrap();

        let tasks = load_directory(dir.path(), None).unwrap();
        let texts: Vec<&str> = tasks.iter().map(|t| t.query_text.as_str()).collect();
        assert_eq!(texts, vec!["SELECT 1", "SELECT 2", "SELECT 3"]);
    }

    #[test]
    fn test_load_csv_rows_and_statements() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports.csv");
        fs::write(
            &path,
            "id,query\n1,\"SELECT 1; SELECT 2\"\n2,\n3,DELETE FROM t\n",
        )
        .unwrap();

        let tasks = load_csv(&path, "query", b',', None).unwrap();
        let label = path.display().to_string();
        let ids: Vec<&str> = tasks.iter().map(|t| t.identifier.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                format!("{label}:row2:stmt1"),
                format!("{label}:row2:stmt2"),
                format!("{label}:row4:stmt1"),
            ]
        );
        assert_eq!(tasks[0].origin, TaskOrigin::Csv);
        assert_eq!(
            tasks[2].context,
            format!("{label} row 4 column 'query' (statement 1)")
        );
    }

    #[test]
    fn test_load_csv_missing_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("reports.csv");
        fs::write(&path, "id;sql\n1;SELECT 1\n").unwrap();

        let err = load_csv(&path, "query", b';', None).unwrap_err();
        assert!(err.to_string().contains("Available columns: id, sql"));
    }

    #[test]
    fn test_parse_csv_spec() {
        let (path, column) = parse_csv_spec("data/q.csv:sql_text").unwrap();
        assert_eq!(path, PathBuf::from("data/q.csv"));
        assert_eq!(column, "sql_text");
        assert!(parse_csv_spec("q.csv").is_err());
        assert!(parse_csv_spec("q.csv:").is_err());
    }

    #[test]
    fn test_collect_tasks_rejects_missing_file() {
        let args = Args::parse_from(["lineagebench", "--sql-file", "/nonexistent/file.sql"]);
        let err = collect_tasks(&args).unwrap_err();
        assert!(err.to_string().contains("SQL file not found"));
    }

    #[test]
    fn test_stdin_tasks() {
        let tasks = stdin_tasks("SELECT 1;SELECT 2", None);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[1].identifier, "<stdin>:2");
        assert_eq!(tasks[1].origin, TaskOrigin::Stdin);
        assert_eq!(tasks[1].source_label(), "<stdin>");
    }
}
