#![allow(dead_code)]

use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use dmadmin::exec::connection::{Connection, Cursor};
use dmadmin::exec::sqlite::SqliteConnection;
use dmadmin::value::{Numeric, Row, Value};
use dmadmin::DriverError;

/// One statement seen by a [`ScriptedConnection`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Executed {
    pub(crate) sql: String,
    pub(crate) bytes: Vec<u8>,
    pub(crate) params: Vec<Value>,
}

/// In-memory driver answering by substring match on the statement text.
///
/// Rejection rules are checked first, then response rules, in insertion
/// order. Unmatched queries return an empty cursor and unmatched
/// statements report `affected` rows.
#[derive(Debug, Default)]
pub(crate) struct ScriptedConnection {
    pub(crate) executed: Vec<Executed>,
    rejections: Vec<(String, Vec<u8>)>,
    responses: Vec<(String, Cursor)>,
    affected: u64,
}

impl ScriptedConnection {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reject(mut self, pattern: &str, message: impl Into<Vec<u8>>) -> Self {
        self.rejections.push((pattern.to_string(), message.into()));
        self
    }

    pub(crate) fn respond(mut self, pattern: &str, cursor: Cursor) -> Self {
        self.responses.push((pattern.to_string(), cursor));
        self
    }

    pub(crate) fn affect(mut self, rows: u64) -> Self {
        self.affected = rows;
        self
    }

    pub(crate) fn statements(&self) -> Vec<&str> {
        self.executed.iter().map(|e| e.sql.as_str()).collect()
    }

    fn record(&mut self, sql: &[u8], params: &[Value]) -> Result<String, DriverError> {
        let text = String::from_utf8_lossy(sql).into_owned();
        self.executed.push(Executed {
            sql: text.clone(),
            bytes: sql.to_vec(),
            params: params.to_vec(),
        });
        match self
            .rejections
            .iter()
            .find(|(pattern, _)| text.contains(pattern.as_str()))
        {
            Some((_, message)) => Err(DriverError::new(message.clone())),
            None => Ok(text),
        }
    }

    fn answer(&mut self, sql: &[u8], params: &[Value]) -> Result<Cursor, DriverError> {
        let text = self.record(sql, params)?;
        Ok(self
            .responses
            .iter()
            .find(|(pattern, _)| text.contains(pattern.as_str()))
            .map(|(_, cursor)| cursor.clone())
            .unwrap_or_default())
    }
}

impl Connection for ScriptedConnection {
    fn execute_query(&mut self, sql: &[u8]) -> Result<Cursor, DriverError> {
        self.answer(sql, &[])
    }

    fn execute_statement(&mut self, sql: &[u8]) -> Result<u64, DriverError> {
        self.record(sql, &[])?;
        Ok(self.affected)
    }

    fn query_prepared(&mut self, sql: &[u8], params: &[Value]) -> Result<Cursor, DriverError> {
        self.answer(sql, params)
    }

    fn execute_prepared(&mut self, sql: &[u8], params: &[Value]) -> Result<u64, DriverError> {
        self.record(sql, params)?;
        Ok(self.affected)
    }
}

pub(crate) fn count_cursor(total: i64) -> Cursor {
    Cursor::new(
        vec!["COUNT(*)".to_string()],
        vec![Row::new().with("COUNT(*)", Value::Numeric(Numeric::Integer(total)))],
    )
}

pub(crate) fn name_cursor(column: &str, names: &[&str]) -> Cursor {
    let rows = names
        .iter()
        .map(|name| Row::new().with(column, Value::text(*name)))
        .collect();
    Cursor::new(vec![column.to_string()], rows)
}

pub(crate) fn numbered_rows(count: i64) -> Cursor {
    let rows = (1..=count)
        .map(|id| Row::new().with("ID", Value::Numeric(Numeric::Integer(id))))
        .collect();
    Cursor::new(vec!["ID".to_string()], rows)
}

/// In-memory SQLite database with a `users` table of `rows` rows.
pub(crate) fn sqlite_users(rows: u64) -> SqliteConnection {
    let mut conn = SqliteConnection::open_in_memory().expect("in-memory sqlite should open");
    conn.execute_batch(
        "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, note TEXT);",
    )
    .expect("fixture schema should apply");
    for id in 1..=rows {
        conn.execute_prepared(
            b"INSERT INTO users (id, name, note) VALUES (?, ?, NULL)",
            &[
                Value::Numeric(Numeric::Integer(id as i64)),
                Value::text(format!("user{id}")),
            ],
        )
        .expect("fixture row should insert");
    }
    conn
}

pub(crate) fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{prefix}_{nanos}"));
    std::fs::create_dir_all(&dir).expect("should create temp dir");
    dir
}
