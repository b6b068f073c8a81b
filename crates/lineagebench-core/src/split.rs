//! Splitting SQL text into individual statements.

use sqlparser::dialect::{dialect_from_str, Dialect, GenericDialect};
use sqlparser::tokenizer::{Token, Tokenizer};
#[cfg(feature = "tracing")]
use tracing::debug;

/// Splits `sql` on statement-terminating semicolons.
///
/// The text is tokenized with the `sqlparser` tokenizer for `dialect` (falling
/// back to the generic dialect for unknown names), so semicolons inside string
/// literals, quoted identifiers and comments are left alone. When tokenization
/// fails the text is split on every `;`. Pieces are trimmed and empty pieces
/// dropped.
///
/// ```
/// use lineagebench_core::split_statements;
///
/// let statements = split_statements("SELECT ';'; DELETE FROM t;", None);
/// assert_eq!(statements, vec!["SELECT ';'", "DELETE FROM t"]);
/// ```
pub fn split_statements(sql: &str, dialect: Option<&str>) -> Vec<String> {
    let dialect: Box<dyn Dialect> = dialect
        .and_then(dialect_from_str)
        .unwrap_or_else(|| Box::new(GenericDialect {}));

    match semicolon_offsets(sql, dialect.as_ref()) {
        Some(offsets) => {
            let mut statements = Vec::new();
            let mut start = 0;
            for offset in offsets {
                push_statement(&mut statements, &sql[start..offset]);
                start = offset + 1;
            }
            push_statement(&mut statements, &sql[start.min(sql.len())..]);
            statements
        }
        None => {
            #[cfg(feature = "tracing")]
            debug!("tokenizer rejected input; splitting on every semicolon");
            naive_split(sql)
        }
    }
}

/// Splits on every `;` without looking at quoting.
pub fn naive_split(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    for piece in sql.split(';') {
        push_statement(&mut statements, piece);
    }
    statements
}

fn push_statement(statements: &mut Vec<String>, piece: &str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        statements.push(piece.to_string());
    }
}

/// Byte offsets of every semicolon token, or `None` if the text does not tokenize.
fn semicolon_offsets(sql: &str, dialect: &dyn Dialect) -> Option<Vec<usize>> {
    let tokens = Tokenizer::new(dialect, sql).tokenize_with_location().ok()?;
    let lines = LineIndex::new(sql);

    let mut offsets = Vec::new();
    for token in tokens {
        if token.token != Token::SemiColon {
            continue;
        }
        let start = token.span.start;
        let offset = lines.offset(sql, start.line as usize, start.column as usize)?;
        if sql[offset..].starts_with(';') {
            offsets.push(offset);
        } else {
            return None;
        }
    }
    Some(offsets)
}

/// Byte offsets of line starts, for converting 1-based line/column locations.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(sql: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(sql.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();
        Self { starts }
    }

    /// sqlparser columns count characters, not bytes.
    fn offset(&self, sql: &str, line: usize, column: usize) -> Option<usize> {
        if line == 0 || column == 0 {
            return None;
        }
        let line_start = *self.starts.get(line - 1)?;
        let line_text = &sql[line_start..];
        let line_text = line_text.split('\n').next().unwrap_or(line_text);
        match line_text.char_indices().nth(column - 1) {
            Some((rel, _)) => Some(line_start + rel),
            None if column - 1 == line_text.chars().count() => Some(line_start + line_text.len()),
            None => None,
        }
    }
}
