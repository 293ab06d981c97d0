//! DM system-dictionary lookups.
//!
//! Lookups never fail: a rejected dictionary query falls back to a narrower
//! view or to an empty answer, and the fallback is logged at `warn`.

use serde::Serialize;
use tracing::warn;

use crate::charset::normalizer::CharsetSettings;
use crate::error::DriverError;
use crate::exec::connection::Connection;
use crate::exec::envelope::QueryResult;
use crate::sql::names::dictionary_name;
use crate::value::{Row, Value};

const CURRENT_SCHEMA_SQL: &str = "SELECT USER FROM DUAL";
const ALL_OWNERS_SQL: &str = "SELECT DISTINCT OWNER FROM ALL_OBJECTS";
const ALL_TABLES_SQL: &str =
    "SELECT TABLE_NAME FROM ALL_TABLES WHERE OWNER = ? ORDER BY TABLE_NAME";
const USER_TABLES_SQL: &str = "SELECT TABLE_NAME FROM USER_TABLES ORDER BY TABLE_NAME";
const PRIMARY_KEY_SQL: &str = "SELECT COL.COLUMN_NAME \
     FROM ALL_CONSTRAINTS CON \
     JOIN ALL_CONS_COLUMNS COL \
       ON CON.OWNER = COL.OWNER \
      AND CON.CONSTRAINT_NAME = COL.CONSTRAINT_NAME \
     WHERE CON.CONSTRAINT_TYPE = 'P' \
       AND CON.OWNER = ? \
       AND CON.TABLE_NAME = ? \
     ORDER BY COL.POSITION";
const COLUMNS_SQL: &str = "SELECT COLUMN_NAME, DATA_TYPE, DATA_LENGTH, NULLABLE \
     FROM ALL_TAB_COLUMNS \
     WHERE OWNER = ? AND TABLE_NAME = ? ORDER BY COLUMN_ID";

/// One column as described by `ALL_TAB_COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// Declared data type, e.g. `VARCHAR`.
    pub data_type: String,
    /// Declared length, when reported.
    pub length: Option<u64>,
    /// True unless the column is declared `NOT NULL`.
    pub nullable: bool,
}

/// Schema of the connected user, upper-cased; empty when unknown.
pub fn current_schema<C>(conn: &mut C, charsets: &CharsetSettings) -> String
where
    C: Connection + ?Sized,
{
    match fetch(conn, CURRENT_SCHEMA_SQL.as_bytes(), &[], charsets) {
        Ok(rows) => first_column(&rows)
            .into_iter()
            .next()
            .map(|user| user.to_uppercase())
            .unwrap_or_default(),
        Err(err) => {
            warn!(error = %err, "current schema lookup failed");
            String::new()
        }
    }
}

/// Every schema owning at least one object.
///
/// Falls back to the current schema alone when `ALL_OBJECTS` is not readable.
pub fn list_schemas<C>(conn: &mut C, charsets: &CharsetSettings) -> Vec<String>
where
    C: Connection + ?Sized,
{
    match fetch(conn, ALL_OWNERS_SQL.as_bytes(), &[], charsets) {
        Ok(rows) => first_column(&rows),
        Err(err) => {
            warn!(error = %err, "ALL_OBJECTS not readable, using current schema");
            let current = current_schema(conn, charsets);
            if current.is_empty() {
                Vec::new()
            } else {
                vec![current]
            }
        }
    }
}

/// Tables owned by `schema`, sorted by name.
///
/// Falls back to `USER_TABLES`, then to an empty list.
pub fn list_tables<C>(conn: &mut C, schema: &str, charsets: &CharsetSettings) -> Vec<String>
where
    C: Connection + ?Sized,
{
    let owner = dictionary_param(schema, charsets);
    match fetch(conn, ALL_TABLES_SQL.as_bytes(), &[owner], charsets) {
        Ok(rows) => return first_column(&rows),
        Err(err) => warn!(schema, error = %err, "ALL_TABLES not readable, trying USER_TABLES"),
    }
    match fetch(conn, USER_TABLES_SQL.as_bytes(), &[], charsets) {
        Ok(rows) => first_column(&rows),
        Err(err) => {
            warn!(schema, error = %err, "USER_TABLES not readable");
            Vec::new()
        }
    }
}

/// First primary-key column of `schema.table`, if the table has one.
pub fn table_primary_key<C>(
    conn: &mut C,
    schema: &str,
    table: &str,
    charsets: &CharsetSettings,
) -> Option<String>
where
    C: Connection + ?Sized,
{
    let params = [
        dictionary_param(schema, charsets),
        dictionary_param(table, charsets),
    ];
    match fetch(conn, PRIMARY_KEY_SQL.as_bytes(), &params, charsets) {
        Ok(rows) => first_column(&rows).into_iter().next(),
        Err(err) => {
            warn!(schema, table, error = %err, "primary key lookup failed");
            None
        }
    }
}

/// Columns of `schema.table` in declaration order.
///
/// Empty when the dictionary is not readable or the table is unknown.
pub fn table_columns<C>(
    conn: &mut C,
    schema: &str,
    table: &str,
    charsets: &CharsetSettings,
) -> Vec<ColumnInfo>
where
    C: Connection + ?Sized,
{
    let params = [
        dictionary_param(schema, charsets),
        dictionary_param(table, charsets),
    ];
    match fetch(conn, COLUMNS_SQL.as_bytes(), &params, charsets) {
        Ok(rows) => rows.iter().filter_map(column_info).collect(),
        Err(err) => {
            warn!(schema, table, error = %err, "column lookup failed");
            Vec::new()
        }
    }
}

/// Append each of `extra` to `schemas` unless already listed.
///
/// Comparison ignores case; blank entries are skipped.
pub fn merge_schema_candidates<I, S>(mut schemas: Vec<String>, extra: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for candidate in extra {
        let candidate = candidate.as_ref().trim();
        if candidate.is_empty() {
            continue;
        }
        if !schemas.iter().any(|s| s.eq_ignore_ascii_case(candidate)) {
            schemas.push(candidate.to_string());
        }
    }
    schemas
}

/// Schemas offered for browsing and the one currently selected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaListing {
    /// Active schema; empty when none could be determined.
    pub active: String,
    /// Known schemas, including the active and configured ones.
    pub schemas: Vec<String>,
}

/// Resolve the active schema and the schema list.
///
/// The active schema is the first non-blank of `requested`,
/// `default_schema` and [`current_schema`], then the first listed schema.
pub fn schema_listing<C>(
    conn: &mut C,
    requested: &str,
    default_schema: &str,
    charsets: &CharsetSettings,
) -> SchemaListing
where
    C: Connection + ?Sized,
{
    let mut active = [requested, default_schema]
        .into_iter()
        .map(str::trim)
        .find(|schema| !schema.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| current_schema(conn, charsets));
    let schemas = list_schemas(conn, charsets);
    if active.is_empty() {
        active = schemas.first().cloned().unwrap_or_default();
    }
    let schemas = merge_schema_candidates(schemas, [active.as_str(), default_schema]);
    SchemaListing { active, schemas }
}

fn dictionary_param(name: &str, charsets: &CharsetSettings) -> Value {
    Value::Text(charsets.outbound(&dictionary_name(name)))
}

fn fetch<C>(
    conn: &mut C,
    sql: &[u8],
    params: &[Value],
    charsets: &CharsetSettings,
) -> Result<Vec<Row>, DriverError>
where
    C: Connection + ?Sized,
{
    let cursor = if params.is_empty() {
        conn.execute_query(sql)?
    } else {
        conn.query_prepared(sql, params)?
    };
    Ok(QueryResult::from_cursor(cursor, charsets).rows)
}

fn first_column(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .filter_map(|row| row.get_index(0))
        .filter(|value| !value.is_null())
        .map(|value| value.to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

fn column_info(row: &Row) -> Option<ColumnInfo> {
    let name = row.get_index(0).filter(|v| !v.is_null())?.to_string();
    let data_type = row
        .get_index(1)
        .filter(|v| !v.is_null())
        .map(Value::to_string)
        .unwrap_or_default();
    let length = row.get_index(2).and_then(Value::as_count);
    let nullable = row
        .get_index(3)
        .map(|v| !v.to_string().eq_ignore_ascii_case("N"))
        .unwrap_or(true);
    Some(ColumnInfo {
        name,
        data_type,
        length,
        nullable,
    })
}
