use serde::Serialize;
use tracing::{debug, info};

use crate::charset::normalizer::{prepare_outbound, CharsetSettings};
use crate::error::{DriverError, Error, Result};
use crate::exec::catalog::{table_columns, table_primary_key, ColumnInfo};
use crate::exec::connection::Connection;
use crate::exec::envelope::QueryResult;
use crate::sql::names::{dictionary_name, quote_escaped, quote_identifier};
use crate::sql::pager::{PageRequest, Pagination, WindowClause};
use crate::value::Value;

/// `"SCHEMA"."TABLE"` with both parts folded to their dictionary spelling.
fn table_reference(schema: &str, table: &str) -> String {
    format!(
        "{}.{}",
        quote_escaped(&dictionary_name(schema)),
        quote_escaped(&dictionary_name(table))
    )
}

/// Read up to `limit` rows of `schema.table` starting at `offset`.
pub fn table_rows<C>(
    conn: &mut C,
    schema: &str,
    table: &str,
    limit: u64,
    offset: u64,
    charsets: &CharsetSettings,
) -> Result<QueryResult>
where
    C: Connection + ?Sized,
{
    let limit = limit.max(1);
    let reference = table_reference(schema, table);
    let mut last_error = DriverError::new("no window clause attempted");

    for clause in WindowClause::FALLBACK_ORDER {
        let sql = format!(
            "SELECT * FROM {reference} {}",
            clause.render_for_table(limit, offset)
        );
        match conn.execute_query(&charsets.outbound(&sql)) {
            Ok(cursor) => return Ok(QueryResult::from_cursor(cursor, charsets)),
            Err(err) => {
                debug!(?clause, table = %reference, error = %err, "window clause rejected");
                last_error = err;
            }
        }
    }
    Err(Error::QuerySyntax(last_error))
}

/// `SELECT COUNT(*)` over `schema.table`; 0 when the count fails.
pub fn table_total_rows<C>(
    conn: &mut C,
    schema: &str,
    table: &str,
    charsets: &CharsetSettings,
) -> u64
where
    C: Connection + ?Sized,
{
    let sql = format!("SELECT COUNT(*) FROM {}", table_reference(schema, table));
    match conn.execute_query(&charsets.outbound(&sql)) {
        Ok(cursor) => cursor.first_value().and_then(Value::as_count).unwrap_or(0),
        Err(err) => {
            debug!(schema, table, error = %err, "table count failed");
            0
        }
    }
}

/// One page of a table together with its dictionary metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TablePage {
    /// Schema as given by the caller.
    pub schema: String,
    /// Table as given by the caller.
    pub table: String,
    /// Column names in display order.
    pub columns: Vec<String>,
    /// Dictionary description of the columns (empty when unavailable).
    pub column_info: Vec<ColumnInfo>,
    /// First primary-key column, used to address rows for editing.
    pub primary_key: Option<String>,
    /// Rows of the current page.
    pub result: QueryResult,
    /// Resolved page position.
    pub pagination: Pagination,
}

/// Fetch one page of `schema.table`.
pub fn browse_table<C>(
    conn: &mut C,
    schema: &str,
    table: &str,
    request: PageRequest,
    charsets: &CharsetSettings,
) -> Result<TablePage>
where
    C: Connection + ?Sized,
{
    let total = table_total_rows(conn, schema, table, charsets);
    let mut pagination = request.resolve(total);
    let result = table_rows(
        conn,
        schema,
        table,
        pagination.page_size,
        pagination.offset,
        charsets,
    )?;
    // A failed count still reads the first window; report what came back.
    if total == 0 && result.row_count > 0 {
        debug!(schema, table, rows = result.row_count, "count unavailable, using fetched rows");
        pagination = Pagination::single_page(result.row_count);
    }

    let column_info = table_columns(conn, schema, table, charsets);
    let columns = if column_info.is_empty() {
        result.columns.clone()
    } else {
        column_info.iter().map(|c| c.name.clone()).collect()
    };
    let primary_key = table_primary_key(conn, schema, table, charsets);

    Ok(TablePage {
        schema: schema.to_string(),
        table: table.to_string(),
        columns,
        column_info,
        primary_key,
        result,
        pagination,
    })
}

/// New content for an edited cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    /// Store SQL NULL.
    Null,
    /// Store the empty string.
    Empty,
    /// Store this text (caller charset).
    Text(String),
}

/// A single-cell edit addressed by primary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellUpdate {
    /// Schema of the table.
    pub schema: String,
    /// Table holding the cell.
    pub table: String,
    /// Edited column.
    pub column: String,
    /// Key column; blank when the table has none.
    pub key_column: String,
    /// Key of the edited row, in the caller charset.
    pub key_value: String,
    /// Replacement content.
    pub value: CellValue,
}

/// Run `UPDATE schema.table SET column = ? WHERE key = ?`.
///
/// Returns the affected-row count reported by the driver.
pub fn update_cell<C>(conn: &mut C, update: &CellUpdate, charsets: &CharsetSettings) -> Result<u64>
where
    C: Connection + ?Sized,
{
    let schema = update.schema.trim();
    let table = update.table.trim();
    let column = update.column.trim();
    if table.is_empty() {
        return Err(Error::MissingParameter("table"));
    }
    if schema.is_empty() {
        return Err(Error::MissingParameter("schema"));
    }
    if column.is_empty() {
        return Err(Error::MissingParameter("column"));
    }
    if update.key_column.trim().is_empty() {
        return Err(Error::NoPrimaryKey {
            schema: schema.to_string(),
            table: table.to_string(),
        });
    }

    let target = format!("{}.{}", quote_identifier(schema), quote_identifier(table));
    let column_sql = quote_identifier(column);
    let key_sql = quote_identifier(&update.key_column);
    let key = outbound_value(&update.key_value, charsets);

    let (sql, params) = match &update.value {
        CellValue::Null => (
            format!("UPDATE {target} SET {column_sql} = NULL WHERE {key_sql} = ?"),
            vec![key],
        ),
        CellValue::Empty => (
            format!("UPDATE {target} SET {column_sql} = ? WHERE {key_sql} = ?"),
            vec![Value::text(""), key],
        ),
        CellValue::Text(text) => (
            format!("UPDATE {target} SET {column_sql} = ? WHERE {key_sql} = ?"),
            vec![outbound_value(text, charsets), key],
        ),
    };

    let affected = conn.execute_prepared(&charsets.outbound(&sql), &params)?;
    info!(%target, column, affected, "cell updated");
    Ok(affected)
}

fn outbound_value(text: &str, charsets: &CharsetSettings) -> Value {
    match prepare_outbound(Some(text.as_bytes()), &charsets.output, &charsets.data) {
        Some(bytes) => Value::Text(bytes.into_owned()),
        None => Value::Null,
    }
}
