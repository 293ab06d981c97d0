//! Charset normalization and SQL rewriting core of a DM database admin tool.
//!
//! Text crossing the driver boundary is detected, scored and converted
//! between the connection charset and the caller's charset. Console
//! statements are qualified with a default schema, classified, counted and
//! paged with a dialect fallback.
#![warn(missing_docs)]

/// Charset scoring, detection, conversion and normalization.
pub mod charset;
/// JSON-backed admin settings.
pub mod config;
/// SQL console orchestration.
pub mod console;
/// Crate error types.
pub mod error;
/// Statement execution against a [`exec::connection::Connection`].
pub mod exec;
/// SQL text utilities: classification, quoting, schema rewriting and paging.
pub mod sql;
/// Cell values and result rows.
pub mod value;

pub use error::{DriverError, Error, Result};
