/// Dictionary lookups against the DM catalog views.
pub mod catalog;
/// The driver-facing `Connection` trait and fetched cursors.
pub mod connection;
/// The uniform `QueryResult` envelope.
pub mod envelope;
/// Plain, windowed, counted and paged statement execution.
pub mod executor;
/// SQLite implementation of `Connection`.
pub mod sqlite;
/// Table paging and single-cell edits.
pub mod table;
