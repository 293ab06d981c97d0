use crate::error::DriverError;
use crate::value::{Row, Value};

/// A fully fetched statement result.
///
/// Drivers buffer the row set; the core never streams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cursor {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl Cursor {
    /// Build a cursor from column metadata and fetched rows.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self { columns, rows }
    }

    /// Column names reported by the statement metadata.
    ///
    /// Available even when the row set is empty.
    pub fn column_names(&self) -> &[String] {
        &self.columns
    }

    /// Take every row.
    pub fn fetch_all(self) -> Vec<Row> {
        self.rows
    }

    /// First column of the first row, if any.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|row| row.get_index(0))
    }
}

/// Database access supplied by the driver layer.
///
/// SQL text is handed over as bytes because it has already been
/// re-encoded into the connection charset. Connection lifecycle (open,
/// close, reconnect) belongs to the implementor; the core only borrows a
/// connection for the duration of one call.
pub trait Connection {
    /// Run a row-producing statement.
    fn execute_query(&mut self, sql: &[u8]) -> Result<Cursor, DriverError>;

    /// Run a statement for its side effects, returning the affected-row count.
    fn execute_statement(&mut self, sql: &[u8]) -> Result<u64, DriverError>;

    /// Prepare and run a row-producing statement with positional `?` parameters.
    fn query_prepared(&mut self, sql: &[u8], params: &[Value]) -> Result<Cursor, DriverError>;

    /// Prepare and run a statement with positional `?` parameters.
    fn execute_prepared(&mut self, sql: &[u8], params: &[Value]) -> Result<u64, DriverError>;
}
