use std::fmt;

use thiserror::Error;

use crate::charset::normalizer::{self, CharsetSettings};

/// Failure reported by a database driver.
///
/// The message is kept as raw bytes: drivers frequently report errors in the
/// connection charset, which is not necessarily UTF-8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    message: Vec<u8>,
}

impl DriverError {
    /// Wrap a raw driver message.
    pub fn new(message: impl Into<Vec<u8>>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The message exactly as the driver produced it.
    pub fn raw_message(&self) -> &[u8] {
        &self.message
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.message))
    }
}

impl std::error::Error for DriverError {}

impl From<rusqlite::Error> for DriverError {
    fn from(err: rusqlite::Error) -> Self {
        DriverError::new(err.to_string())
    }
}

/// Errors propagated to callers of the core.
///
/// Degraded modes (unsupported count query, unknown charset, lossy
/// conversion) are not errors and never show up here.
#[derive(Debug, Error)]
pub enum Error {
    /// The driver rejected a statement.
    #[error("SQL execution failed: {0}")]
    QuerySyntax(#[from] DriverError),

    /// A cell update was requested for a table without a usable key column.
    #[error("table {schema}.{table} has no primary key")]
    NoPrimaryKey {
        /// Schema of the table.
        schema: String,
        /// Table name.
        table: String,
    },

    /// A required request parameter was blank.
    #[error("missing parameter: {0}")]
    MissingParameter(&'static str),

    /// Invalid configuration value or file.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Filesystem failure while loading configuration.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Human-facing message, with driver text passed through error normalization.
    pub fn display_message(&self, charsets: &CharsetSettings) -> String {
        match self {
            Error::QuerySyntax(driver) => {
                let normalized = normalizer::normalize_error(driver.raw_message(), charsets);
                String::from_utf8_lossy(&normalized).into_owned()
            }
            other => other.to_string(),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
