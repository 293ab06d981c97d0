/// True for identifiers made only of `[A-Za-z0-9_$]`.
///
/// Such identifiers are folded to upper case when written unquoted, which
/// is how the DM catalog stores them.
pub fn is_bare_identifier(ident: &str) -> bool {
    !ident.is_empty()
        && ident
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'$')
}

/// True when `ident` is wrapped in double quotes.
pub fn is_double_quoted(ident: &str) -> bool {
    ident.len() >= 2 && ident.starts_with('"') && ident.ends_with('"')
}

/// Wrap `ident` in double quotes, doubling embedded quotes.
pub fn quote_escaped(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Return the identifier without surrounding double quotes, with doubled
/// quotes collapsed back to one.
pub fn unquote_identifier(ident: &str) -> String {
    if is_double_quoted(ident) {
        ident[1..ident.len() - 1].replace("\"\"", "\"")
    } else {
        ident.to_string()
    }
}

/// Quote an identifier for use in generated SQL.
///
/// - blank input becomes `""`
/// - an already double-quoted identifier is returned unchanged
/// - a bare identifier is upper-cased first
/// - the result is double-quoted with embedded quotes doubled
pub fn quote_identifier(name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return "\"\"".to_string();
    }
    if is_double_quoted(trimmed) {
        return trimmed.to_string();
    }
    if is_bare_identifier(trimmed) {
        return quote_escaped(&trimmed.to_ascii_uppercase());
    }
    quote_escaped(trimmed)
}

/// Fold a schema name the way an unquoted identifier would be folded.
///
/// Bare names are upper-cased and left unquoted (`app` -> `APP`); anything
/// else is quoted and escaped verbatim.
pub fn fold_schema(schema: &str) -> String {
    let upper = schema.to_ascii_uppercase();
    if is_bare_identifier(&upper) {
        upper
    } else {
        quote_escaped(schema)
    }
}

/// Name as stored in the system catalog.
///
/// Quoted names keep their exact spelling; everything else is upper-cased.
pub fn dictionary_name(name: &str) -> String {
    let trimmed = name.trim();
    if is_double_quoted(trimmed) {
        unquote_identifier(trimmed)
    } else {
        trimmed.to_ascii_uppercase()
    }
}

/// Split a potentially schema-qualified name into `(schema, relation)`.
///
/// Dots inside double-quoted parts do not split, e.g. `"my.schema".docs`.
/// Parts are returned as written (quotes preserved) so callers can decide
/// how to fold them. Returns `None` for unqualified names.
pub fn split_schema_and_relation(name: &str) -> Option<(String, String)> {
    let mut in_quotes = false;
    let mut split_at = None;

    for (idx, ch) in name.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            '.' if !in_quotes => split_at = Some(idx),
            _ => {}
        }
    }

    let idx = split_at?;
    let schema = name[..idx].trim();
    let relation = name[idx + 1..].trim();
    if schema.is_empty() || relation.is_empty() {
        return None;
    }
    Some((schema.to_string(), relation.to_string()))
}
