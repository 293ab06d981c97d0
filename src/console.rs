//! The SQL console: one submitted statement in, one displayable outcome out.
//!
//! [`run_sql`] chains the pieces the way an interactive console uses them:
//! schema qualification, re-encoding into the connection charset,
//! classification, then paged or plain execution. Failures are folded
//! into [`ConsoleOutcome::error`] so the caller always gets something to
//! render.

use serde::Serialize;
use tracing::info;

use crate::charset::normalizer::{prepare_outbound, CharsetSettings};
use crate::config::AdminConfig;
use crate::error::Error;
use crate::exec::connection::Connection;
use crate::exec::envelope::QueryResult;
use crate::exec::executor::{exec, exec_paged};
use crate::sql::classifier::{classify, StatementKind};
use crate::sql::pager::{PageRequest, Pagination};
use crate::sql::schema_rewrite::apply_default_schema;

/// Per-request console settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleOptions {
    /// Active schema used for qualification (blank = none).
    pub schema: String,
    /// Qualify the first unqualified table reference.
    pub auto_schema: bool,
    /// Requested page, 1-based.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Charset configuration of the connection.
    pub charsets: CharsetSettings,
}

impl ConsoleOptions {
    /// Options for `page` of a statement run against `schema`.
    ///
    /// A blank `schema` falls back to the configured default schema.
    pub fn from_config(config: &AdminConfig, schema: &str, page: u64) -> Self {
        let schema = if schema.trim().is_empty() {
            config.default_schema.trim()
        } else {
            schema.trim()
        };
        Self {
            schema: schema.to_string(),
            auto_schema: config.auto_schema,
            page,
            page_size: config.page_size(),
            charsets: config.charsets(),
        }
    }
}

/// Everything the console shows after running a statement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsoleOutcome {
    /// The statement as it should be echoed back (after schema rewriting).
    pub sql: String,
    /// Statement classification; absent when nothing ran.
    pub kind: Option<StatementKind>,
    /// Informational notice, e.g. the applied default schema.
    pub notice: Option<String>,
    /// Success message.
    pub message: Option<String>,
    /// Failure message, normalized into the output charset.
    pub error: Option<String>,
    /// Fetched rows or affected-row count.
    pub result: Option<QueryResult>,
    /// Page position for queries.
    pub pagination: Option<Pagination>,
    /// True when the query could not be counted and ran unpaged.
    pub degraded: bool,
}

impl ConsoleOutcome {
    fn new(sql: &str) -> Self {
        Self {
            sql: sql.to_string(),
            kind: None,
            notice: None,
            message: None,
            error: None,
            result: None,
            pagination: None,
            degraded: false,
        }
    }

    /// True when the statement ran without error.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Run one console statement.
pub fn run_sql<C>(conn: &mut C, sql: &str, options: &ConsoleOptions) -> ConsoleOutcome
where
    C: Connection + ?Sized,
{
    let mut outcome = ConsoleOutcome::new(sql);
    if sql.trim().is_empty() {
        outcome.message = Some("No SQL to run.".to_string());
        return outcome;
    }

    let mut sql_to_run = sql.to_string();
    if options.auto_schema && !options.schema.is_empty() {
        let rewrite = apply_default_schema(&sql_to_run, &options.schema);
        if rewrite.changed {
            info!(schema = %options.schema, sql = %rewrite.sql, "applied default schema");
            outcome.notice = Some(format!("Applied default schema: {}.", options.schema));
            outcome.sql = rewrite.sql.clone();
            sql_to_run = rewrite.sql;
        }
    }

    let charsets = &options.charsets;
    let encoded = prepare_outbound(
        Some(sql_to_run.as_bytes()),
        &charsets.output,
        &charsets.data,
    )
    .unwrap_or_default();

    let kind = classify(&sql_to_run);
    outcome.kind = Some(kind);

    let executed = match kind {
        StatementKind::Query => {
            let request = PageRequest::new(options.page, options.page_size);
            exec_paged(conn, &encoded, request, charsets).map(|paged| {
                outcome.message = Some(format!(
                    "Query OK, {} rows returned.",
                    paged.pagination.total_rows
                ));
                outcome.pagination = Some(paged.pagination);
                outcome.degraded = paged.degraded;
                paged.result
            })
        }
        StatementKind::Mutation => exec(conn, &encoded, charsets).map(|result| {
            outcome.message = Some(format!("Query OK, {} rows affected.", result.affected));
            result
        }),
    };

    match executed {
        Ok(result) => outcome.result = Some(result),
        Err(err) => outcome.error = Some(failure_message(&err, charsets)),
    }
    outcome
}

fn failure_message(err: &Error, charsets: &CharsetSettings) -> String {
    match err {
        Error::QuerySyntax(driver) if driver.raw_message().is_empty() => {
            "SQL execution failed.".to_string()
        }
        _ => err.display_message(charsets),
    }
}
