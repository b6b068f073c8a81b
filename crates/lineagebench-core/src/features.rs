//! Lexical feature extraction.
//!
//! Cheap regex scans over statement text: comment stripping, leading keyword
//! tokens and structural counts. None of this parses SQL; the counts are
//! heuristics for bucketing statements by complexity.

use regex::Regex;
use std::sync::OnceLock;

use crate::types::QueryComplexity;

/// Number of leading tokens considered by the statement-type classifier.
pub const DEFAULT_TOKEN_LIMIT: usize = 6;

fn block_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("Invalid regex pattern"))
}

fn line_comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // `--`, `//` and `#` comments run to end of line
    RE.get_or_init(|| Regex::new(r"(?m)(?:--|//|#).*$").expect("Invalid regex pattern"))
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z_#]+").expect("Invalid regex pattern"))
}

struct StructuralPatterns {
    cte: Regex,
    select: Regex,
    joins: Vec<Regex>,
    union: Regex,
    windows: Vec<Regex>,
}

fn structural_patterns() -> &'static StructuralPatterns {
    static PATTERNS: OnceLock<StructuralPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        let compile = |pattern: &str| Regex::new(pattern).expect("Invalid regex pattern");
        StructuralPatterns {
            cte: compile(r"(?i)\bAS\s*\("),
            select: compile(r"(?i)\bSELECT\b"),
            joins: [
                r"(?i)\bINNER\s+JOIN\b",
                r"(?i)\bLEFT\s+JOIN\b",
                r"(?i)\bRIGHT\s+JOIN\b",
                r"(?i)\bFULL\s+JOIN\b",
                r"(?i)\bCROSS\s+JOIN\b",
                r"(?i)\bJOIN\b",
            ]
            .into_iter()
            .map(compile)
            .collect(),
            union: compile(r"(?i)\bUNION\s+(?:ALL\s+)?"),
            windows: [
                r"(?i)\bROW_NUMBER\s*\(",
                r"(?i)\bRANK\s*\(",
                r"(?i)\bDENSE_RANK\s*\(",
                r"(?i)\bLEAD\s*\(",
                r"(?i)\bLAG\s*\(",
                r"(?i)\bFIRST_VALUE\s*\(",
                r"(?i)\bLAST_VALUE\s*\(",
                r"(?i)\bOVER\s*\(",
            ]
            .into_iter()
            .map(compile)
            .collect(),
        }
    })
}

/// Removes block comments, then `--`, `//` and `#` line comments, and trims the result.
pub fn strip_comments(sql: &str) -> String {
    let without_blocks = block_comment_regex().replace_all(sql, " ");
    let without_lines = line_comment_regex().replace_all(&without_blocks, " ");
    without_lines.trim().to_string()
}

/// The first `limit` keyword-like tokens of the statement, upper-cased.
///
/// ```
/// use lineagebench_core::leading_tokens;
///
/// let tokens = leading_tokens("/* load */ insert into t select 1", 3);
/// assert_eq!(tokens, vec!["INSERT", "INTO", "T"]);
/// ```
pub fn leading_tokens(sql: &str, limit: usize) -> Vec<String> {
    let cleaned = strip_comments(sql);
    token_regex()
        .find_iter(&cleaned)
        .take(limit)
        .map(|token| token.as_str().to_uppercase())
        .collect()
}

/// Structural complexity metrics for one statement.
///
/// Counts run over the comment-stripped text; the CTE depth estimate and the
/// line/char counts use the raw text.
pub fn analyze_complexity(sql: &str) -> QueryComplexity {
    let patterns = structural_patterns();
    let cleaned = strip_comments(sql);
    let count = |re: &Regex| re.find_iter(&cleaned).count();

    let cte_count = count(&patterns.cte);
    let max_cte_depth = if cte_count > 0 {
        (max_paren_depth(sql) / 2).min(cte_count)
    } else {
        0
    };

    QueryComplexity {
        cte_count,
        max_cte_depth,
        subquery_count: count(&patterns.select).saturating_sub(1),
        join_count: patterns.joins.iter().map(count).sum(),
        union_count: count(&patterns.union),
        window_function_count: patterns.windows.iter().map(count).sum(),
        line_count: sql.lines().count(),
        char_count: sql.chars().count(),
    }
}

fn max_paren_depth(sql: &str) -> usize {
    let mut depth: i64 = 0;
    let mut max_depth: i64 = 0;
    for ch in sql.chars() {
        match ch {
            '(' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            ')' => depth -= 1,
            _ => {}
        }
    }
    max_depth as usize
}
