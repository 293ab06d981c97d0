//! [`Connection`] over an embedded SQLite database.
//!
//! SQLite has no `OFFSET .. FETCH` clause and no DM dictionary views, so
//! it drives every fallback path of the executor and catalog.

use std::path::Path;

use rusqlite::params_from_iter;
use rusqlite::types::{Value as SqlValue, ValueRef};

use crate::error::DriverError;
use crate::exec::connection::{Connection, Cursor};
use crate::value::{Numeric, Row, Value};

/// A SQLite database handle.
pub struct SqliteConnection {
    inner: rusqlite::Connection,
}

impl SqliteConnection {
    /// Open (or create) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DriverError> {
        Ok(Self {
            inner: rusqlite::Connection::open(path)?,
        })
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self, DriverError> {
        Ok(Self {
            inner: rusqlite::Connection::open_in_memory()?,
        })
    }

    /// Run a batch of `;`-separated statements, e.g. a fixture script.
    pub fn execute_batch(&mut self, sql: &str) -> Result<(), DriverError> {
        self.inner.execute_batch(sql)?;
        Ok(())
    }

    fn query(&mut self, sql: &[u8], params: &[Value]) -> Result<Cursor, DriverError> {
        let mut statement = self.inner.prepare(sql_text(sql)?)?;
        let columns = statement
            .column_names()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();

        let mut rows = statement.query(params_from_iter(params.iter().map(to_sql_value)))?;
        let mut fetched = Vec::new();
        while let Some(row) = rows.next()? {
            let mut record = Row::new();
            for (idx, name) in columns.iter().enumerate() {
                record.set(name.clone(), from_value_ref(row.get_ref(idx)?));
            }
            fetched.push(record);
        }
        Ok(Cursor::new(columns, fetched))
    }

    fn execute(&mut self, sql: &[u8], params: &[Value]) -> Result<u64, DriverError> {
        let affected = self.inner.execute(
            sql_text(sql)?,
            params_from_iter(params.iter().map(to_sql_value)),
        )?;
        Ok(affected as u64)
    }
}

impl Connection for SqliteConnection {
    fn execute_query(&mut self, sql: &[u8]) -> Result<Cursor, DriverError> {
        self.query(sql, &[])
    }

    fn execute_statement(&mut self, sql: &[u8]) -> Result<u64, DriverError> {
        self.execute(sql, &[])
    }

    fn query_prepared(&mut self, sql: &[u8], params: &[Value]) -> Result<Cursor, DriverError> {
        self.query(sql, params)
    }

    fn execute_prepared(&mut self, sql: &[u8], params: &[Value]) -> Result<u64, DriverError> {
        self.execute(sql, params)
    }
}

/// SQLite only accepts UTF-8 statement text.
fn sql_text(sql: &[u8]) -> Result<&str, DriverError> {
    std::str::from_utf8(sql)
        .map_err(|err| DriverError::new(format!("statement is not valid UTF-8: {err}")))
}

fn from_value_ref(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::Numeric(Numeric::Integer(n)),
        ValueRef::Real(x) => Value::Numeric(Numeric::Real(x)),
        ValueRef::Text(bytes) => Value::Text(bytes.to_vec()),
        ValueRef::Blob(bytes) => Value::Binary(bytes.to_vec()),
    }
}

fn to_sql_value(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Numeric(Numeric::Integer(n)) => SqlValue::Integer(*n),
        Value::Numeric(Numeric::Real(x)) => SqlValue::Real(*x),
        Value::Text(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => SqlValue::Text(text.to_string()),
            Err(_) => SqlValue::Blob(bytes.clone()),
        },
        Value::Binary(bytes) => SqlValue::Blob(bytes.clone()),
        Value::Array(_) => SqlValue::Text(value.to_string()),
    }
}
