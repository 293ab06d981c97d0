use std::fmt;

use serde::Serialize;

/// Leading keywords of statements that produce a row set.
const QUERY_KEYWORDS: &[&str] = &["SELECT", "WITH", "SHOW", "DESCRIBE", "EXPLAIN"];

/// Shape of a statement, decided by its leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    /// Produces rows; eligible for counting and paging.
    Query,
    /// Anything else; executed for its affected-row count.
    Mutation,
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementKind::Query => write!(f, "QUERY"),
            StatementKind::Mutation => write!(f, "MUTATION"),
        }
    }
}

fn is_token_delimiter(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\n' | '\r' | '(')
}

/// First token of `sql`, upper-cased.
///
/// Leading whitespace and opening parentheses are skipped, so
/// `(SELECT 1) UNION (SELECT 2)` yields `SELECT`. Empty input yields an
/// empty string.
pub fn leading_keyword(sql: &str) -> String {
    let rest = sql.trim_start_matches(is_token_delimiter);
    let end = rest.find(is_token_delimiter).unwrap_or(rest.len());
    rest[..end].to_ascii_uppercase()
}

/// Classify a statement as [`StatementKind::Query`] or [`StatementKind::Mutation`].
pub fn classify(sql: &str) -> StatementKind {
    let keyword = leading_keyword(sql);
    if QUERY_KEYWORDS.contains(&keyword.as_str()) {
        StatementKind::Query
    } else {
        StatementKind::Mutation
    }
}
