use serde::Serialize;

use crate::charset::normalizer::{normalize_rows, CharsetSettings};
use crate::exec::connection::Cursor;
use crate::value::Row;

/// Which part of a [`QueryResult`] is meaningful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    /// Nothing was executed.
    None,
    /// `columns`, `rows` and `row_count` are set.
    Rows,
    /// `affected` is set.
    Affected,
}

/// Uniform result envelope returned by every execution entry point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    /// Result shape.
    #[serde(rename = "type")]
    pub kind: ResultKind,
    /// Column names in order.
    pub columns: Vec<String>,
    /// Rows, normalized into the output charset.
    pub rows: Vec<Row>,
    /// Rows touched by a mutation.
    pub affected: u64,
    /// Number of rows in `rows`.
    pub row_count: u64,
}

impl QueryResult {
    /// Envelope for "nothing ran".
    pub fn none() -> Self {
        Self {
            kind: ResultKind::None,
            columns: Vec::new(),
            rows: Vec::new(),
            affected: 0,
            row_count: 0,
        }
    }

    /// Envelope for a mutation.
    pub fn affected(count: u64) -> Self {
        Self {
            kind: ResultKind::Affected,
            affected: count,
            ..Self::none()
        }
    }

    /// Envelope for a fetched row set.
    ///
    /// Text cells are converted from the data charset to the output
    /// charset. Columns come from the first row, or from the statement
    /// metadata when no row came back.
    pub fn from_cursor(cursor: Cursor, charsets: &CharsetSettings) -> Self {
        let metadata_columns = cursor.column_names().to_vec();
        let mut rows = cursor.fetch_all();
        normalize_rows(&mut rows, &charsets.data, &charsets.output);

        let columns = match rows.first() {
            Some(first) => first.columns(),
            None => metadata_columns,
        };
        Self {
            kind: ResultKind::Rows,
            columns,
            row_count: rows.len() as u64,
            rows,
            affected: 0,
        }
    }
}
