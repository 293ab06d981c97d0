//! Default-schema injection for raw SQL text.
//!
//! This is a byte scanner, not a parser. Four keyword sequences are tried
//! in fixed priority order:
//!
//! 1. `FROM`
//! 2. `UPDATE`
//! 3. `INSERT INTO`
//! 4. `DELETE FROM`
//!
//! For each sequence only the first place where it is followed by a table
//! reference is considered. A keyword must start at a word boundary and be
//! followed by whitespace. A reference is a backtick-quoted, double-quoted
//! or bare (`[A-Za-z0-9_$]+`) identifier, optionally followed by `.` and a
//! second one. An opening parenthesis is not a reference, so for
//! `FROM (SELECT .. FROM t)` the inner `FROM t` is the first match. If that
//! first reference is already qualified, the whole sequence is skipped and
//! the next one is tried. At most one reference is rewritten per statement.
//!
//! Keywords inside string literals, quoted identifiers and comments are
//! ignored.
//!
//! Rewriting is only idempotent for statements with a single table
//! reference. With several, a second pass qualifies the next one:
//! `UPDATE t SET a = (SELECT b FROM x)` first becomes
//! `UPDATE t SET a = (SELECT b FROM APP.X)`, and applying it again also
//! qualifies `t`.

use tracing::debug;

use crate::sql::names::{fold_schema, is_bare_identifier, quote_escaped};

/// Keyword sequences in priority order.
const PATTERNS: [&[&str]; 4] = [&["FROM"], &["UPDATE"], &["INSERT", "INTO"], &["DELETE", "FROM"]];

/// Outcome of [`apply_default_schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRewrite {
    /// The statement, rewritten or not.
    pub sql: String,
    /// True when a table reference was qualified.
    pub changed: bool,
}

impl SchemaRewrite {
    fn unchanged(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            changed: false,
        }
    }
}

/// A keyword sequence followed by a table reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReferenceMatch {
    /// Start of the first keyword.
    start: usize,
    /// End of the last keyword.
    keyword_end: usize,
    /// Start of the reference.
    reference_start: usize,
    /// End of the reference.
    end: usize,
}

/// Qualify the first unqualified table reference in `sql` with `schema`.
pub fn apply_default_schema(sql: &str, schema: &str) -> SchemaRewrite {
    let schema = schema.trim();
    if schema.is_empty() {
        return SchemaRewrite::unchanged(sql);
    }
    let schema = fold_schema(schema);

    for keywords in PATTERNS {
        let Some(found) = find_reference(sql, keywords) else {
            continue;
        };
        let reference = &sql[found.reference_start..found.end];
        if reference.contains('.') {
            debug!(
                keyword = %keywords.join(" "),
                reference,
                "reference already qualified, trying next keyword"
            );
            continue;
        }

        let rewritten = format!(
            "{}{} {}.{}{}",
            &sql[..found.start],
            &sql[found.start..found.keyword_end],
            schema,
            fold_table(reference),
            &sql[found.end..]
        );
        return SchemaRewrite {
            sql: rewritten,
            changed: true,
        };
    }

    SchemaRewrite::unchanged(sql)
}

/// Fold a captured table reference for use after `<schema>.`.
fn fold_table(reference: &str) -> String {
    if let Some(inner) = reference
        .strip_prefix('`')
        .and_then(|rest| rest.strip_suffix('`'))
    {
        return quote_escaped(inner);
    }
    if reference.starts_with('"') {
        return reference.to_string();
    }
    if is_bare_identifier(reference) {
        return reference.to_ascii_uppercase();
    }
    quote_escaped(reference)
}

/// Find the first occurrence of `keywords` followed by a table reference.
fn find_reference(sql: &str, keywords: &[&str]) -> Option<ReferenceMatch> {
    let bytes = sql.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => i = skip_quoted(bytes, i, b'\''),
            b'"' => i = skip_quoted(bytes, i, b'"'),
            b'`' => i = skip_quoted(bytes, i, b'`'),
            b'-' if bytes.get(i + 1) == Some(&b'-') => i = skip_line_comment(bytes, i),
            b'/' if bytes.get(i + 1) == Some(&b'*') => i = skip_block_comment(bytes, i),
            b if b.is_ascii_alphabetic() && (i == 0 || !is_word_byte(bytes[i - 1])) => {
                if let Some(found) = match_at(bytes, i, keywords) {
                    return Some(found);
                }
                i += 1;
            }
            _ => i += 1,
        }
    }
    None
}

/// Try to match `keywords` + whitespace + reference at `start`.
fn match_at(bytes: &[u8], start: usize, keywords: &[&str]) -> Option<ReferenceMatch> {
    let mut pos = start;
    let mut keyword_end = start;
    for (idx, keyword) in keywords.iter().enumerate() {
        if idx > 0 {
            pos = skip_required_whitespace(bytes, pos)?;
        }
        let candidate = bytes.get(pos..pos + keyword.len())?;
        if !candidate.eq_ignore_ascii_case(keyword.as_bytes()) {
            return None;
        }
        pos += keyword.len();
        keyword_end = pos;
    }
    let reference_start = skip_required_whitespace(bytes, pos)?;
    let end = scan_reference(bytes, reference_start)?;
    Some(ReferenceMatch {
        start,
        keyword_end,
        reference_start,
        end,
    })
}

/// `part ( '.' part )?`; a dangling dot is left out of the reference.
fn scan_reference(bytes: &[u8], start: usize) -> Option<usize> {
    let end = scan_part(bytes, start)?;
    if bytes.get(end) == Some(&b'.') {
        if let Some(qualified_end) = scan_part(bytes, end + 1) {
            return Some(qualified_end);
        }
    }
    Some(end)
}

/// One identifier: backtick-quoted, double-quoted (with `""` escapes) or bare.
fn scan_part(bytes: &[u8], start: usize) -> Option<usize> {
    match *bytes.get(start)? {
        b'`' => {
            let close = start + 1 + bytes[start + 1..].iter().position(|b| *b == b'`')?;
            (close > start + 1).then_some(close + 1)
        }
        b'"' => {
            let mut pos = start + 1;
            loop {
                let close = pos + bytes[pos..].iter().position(|b| *b == b'"')?;
                if bytes.get(close + 1) == Some(&b'"') {
                    pos = close + 2;
                    continue;
                }
                return (close > start + 1).then_some(close + 1);
            }
        }
        _ => {
            let len = bytes[start..]
                .iter()
                .take_while(|b| b.is_ascii_alphanumeric() || **b == b'_' || **b == b'$')
                .count();
            (len > 0).then_some(start + len)
        }
    }
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b'\x0b' | b'\x0c')
}

/// Skip one or more whitespace bytes; `None` when there is none at `pos`.
fn skip_required_whitespace(bytes: &[u8], pos: usize) -> Option<usize> {
    let len = bytes[pos..].iter().take_while(|b| is_space(**b)).count();
    (len > 0).then_some(pos + len)
}

/// Position after the quoted run opened at `start`; doubled quotes are escapes.
fn skip_quoted(bytes: &[u8], start: usize, quote: u8) -> usize {
    let mut pos = start + 1;
    while pos < bytes.len() {
        if bytes[pos] == quote {
            if bytes.get(pos + 1) == Some(&quote) {
                pos += 2;
                continue;
            }
            return pos + 1;
        }
        pos += 1;
    }
    bytes.len()
}

fn skip_line_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start..]
        .iter()
        .position(|b| *b == b'\n')
        .map_or(bytes.len(), |offset| start + offset + 1)
}

fn skip_block_comment(bytes: &[u8], start: usize) -> usize {
    bytes[start + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |offset| start + 2 + offset + 2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rewrite(sql: &str, schema: &str) -> (String, bool) {
        let result = apply_default_schema(sql, schema);
        (result.sql, result.changed)
    }

    #[test]
    fn qualifies_bare_table_after_from() {
        assert_eq!(
            rewrite("SELECT * FROM users WHERE id=1", "app"),
            ("SELECT * FROM APP.USERS WHERE id=1".to_string(), true)
        );
    }

    #[test]
    fn leaves_qualified_reference_alone() {
        assert_eq!(
            rewrite("SELECT * FROM s.users", "app"),
            ("SELECT * FROM s.users".to_string(), false)
        );
    }

    #[test]
    fn blank_schema_is_noop() {
        assert_eq!(
            rewrite("SELECT * FROM users", "  "),
            ("SELECT * FROM users".to_string(), false)
        );
    }

    #[test]
    fn single_reference_rewriting_is_idempotent() {
        for sql in [
            "select * from users",
            "UPDATE t SET a = 1",
            "insert into `log` values (1)",
            "DELETE FROM \"Mixed\" WHERE x = 1",
        ] {
            for schema in ["app", "my schema", "a\"b"] {
                let once = apply_default_schema(sql, schema);
                assert!(once.changed, "{sql} should be rewritten with {schema}");
                let twice = apply_default_schema(&once.sql, schema);
                assert!(!twice.changed, "{} should be stable", once.sql);
                assert_eq!(twice.sql, once.sql);
            }
        }
    }

    #[test]
    fn each_pass_qualifies_one_more_reference() {
        let sql = "UPDATE t SET a = (SELECT b FROM x)";
        let once = rewrite(sql, "app");
        assert_eq!(once, ("UPDATE t SET a = (SELECT b FROM APP.X)".to_string(), true));

        let twice = rewrite(&once.0, "app");
        assert_eq!(
            twice,
            ("UPDATE APP.T SET a = (SELECT b FROM APP.X)".to_string(), true)
        );
        assert!(!rewrite(&twice.0, "app").1);
    }

    #[test]
    fn keyword_spelling_is_kept_and_whitespace_collapsed() {
        assert_eq!(
            rewrite("insert   into\n  logs (a) values (1)", "app").0,
            "insert   into APP.LOGS (a) values (1)"
        );
        assert_eq!(
            rewrite("update\tlogs set a = 1", "app").0,
            "update APP.LOGS set a = 1"
        );
    }

    #[test]
    fn quoted_tables_are_folded_to_double_quotes() {
        assert_eq!(
            rewrite("SELECT * FROM `order items`", "app").0,
            "SELECT * FROM APP.\"order items\""
        );
        assert_eq!(
            rewrite("SELECT * FROM \"Users\"", "app").0,
            "SELECT * FROM APP.\"Users\""
        );
    }

    #[test]
    fn unusual_schema_names_are_quoted() {
        assert_eq!(
            rewrite("SELECT * FROM users", "my-app").0,
            "SELECT * FROM \"my-app\".USERS"
        );
    }

    #[test]
    fn subquery_after_from_is_skipped_for_the_inner_table() {
        assert_eq!(
            rewrite("SELECT * FROM (SELECT id FROM users) t", "app").0,
            "SELECT * FROM (SELECT id FROM APP.USERS) t"
        );
    }

    #[test]
    fn qualified_first_match_falls_through_to_next_keyword() {
        assert_eq!(
            rewrite("UPDATE t SET a = (SELECT b FROM s.x)", "app"),
            ("UPDATE APP.T SET a = (SELECT b FROM s.x)".to_string(), true)
        );
        // Later FROM clauses are not considered once the first one is qualified.
        assert_eq!(
            rewrite("SELECT * FROM s.a JOIN b ON 1=1 WHERE x IN (SELECT y FROM c)", "app"),
            (
                "SELECT * FROM s.a JOIN b ON 1=1 WHERE x IN (SELECT y FROM c)".to_string(),
                false
            )
        );
    }

    #[test]
    fn only_one_substitution_happens() {
        assert_eq!(
            rewrite("SELECT * FROM a WHERE id IN (SELECT id FROM b)", "app").0,
            "SELECT * FROM APP.A WHERE id IN (SELECT id FROM b)"
        );
    }

    #[test]
    fn keywords_need_word_boundary_and_whitespace() {
        assert_eq!(
            rewrite("SELECT date_from FROM logs", "app").0,
            "SELECT date_from FROM APP.LOGS"
        );
        assert!(!apply_default_schema("SELECT 1 FROM(dual)", "app").changed);
    }

    #[test]
    fn literals_and_comments_are_not_scanned() {
        assert_eq!(
            rewrite("SELECT 'a FROM b' AS x FROM logs", "app").0,
            "SELECT 'a FROM b' AS x FROM APP.LOGS"
        );
        assert_eq!(
            rewrite("-- from notes\nSELECT * /* from x */ FROM logs", "app").0,
            "-- from notes\nSELECT * /* from x */ FROM APP.LOGS"
        );
    }

    #[test]
    fn delete_and_insert_are_covered() {
        assert_eq!(
            rewrite("DELETE FROM logs WHERE id = 3", "app").0,
            "DELETE FROM APP.LOGS WHERE id = 3"
        );
        assert_eq!(
            rewrite("INSERT INTO logs VALUES (1)", "app").0,
            "INSERT INTO APP.LOGS VALUES (1)"
        );
    }

    #[test]
    fn statements_without_table_references_are_unchanged() {
        assert!(!apply_default_schema("SELECT 1", "app").changed);
        assert!(!apply_default_schema("", "app").changed);
    }
}
