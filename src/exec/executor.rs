//! Statement execution: single shot, windowed, counted and paged.
//!
//! Every entry point takes SQL already encoded in the connection charset
//! and the [`CharsetSettings`] used to normalize fetched text.

use serde::Serialize;
use tracing::debug;

use crate::charset::normalizer::CharsetSettings;
use crate::error::{DriverError, Error, Result};
use crate::exec::connection::Connection;
use crate::exec::envelope::QueryResult;
use crate::sql::classifier::{classify, StatementKind};
use crate::sql::pager::{count_query, window_query, PageRequest, Pagination, WindowClause};

/// Execute one statement and wrap the outcome in a [`QueryResult`].
///
/// Queries come back as `rows`, everything else as `affected`.
pub fn exec<C>(conn: &mut C, sql: &[u8], charsets: &CharsetSettings) -> Result<QueryResult>
where
    C: Connection + ?Sized,
{
    match classify(&String::from_utf8_lossy(sql)) {
        StatementKind::Query => {
            let cursor = conn.execute_query(sql)?;
            Ok(QueryResult::from_cursor(cursor, charsets))
        }
        StatementKind::Mutation => {
            let affected = conn.execute_statement(sql)?;
            Ok(QueryResult::affected(affected))
        }
    }
}

/// Fetch `page_size` rows of `sql` starting at `offset`.
///
/// Tries each [`WindowClause`] in [`WindowClause::FALLBACK_ORDER`]; the
/// error of the last attempt is returned when every dialect rejects it.
pub fn exec_page<C>(
    conn: &mut C,
    sql: &[u8],
    page_size: u64,
    offset: u64,
    charsets: &CharsetSettings,
) -> Result<QueryResult>
where
    C: Connection + ?Sized,
{
    let limit = page_size.max(1);
    let mut last_error = DriverError::new("no window clause attempted");

    for clause in WindowClause::FALLBACK_ORDER {
        let paged = window_query(sql, clause, limit, offset);
        match conn.execute_query(&paged) {
            Ok(cursor) => return Ok(QueryResult::from_cursor(cursor, charsets)),
            Err(err) => {
                debug!(?clause, error = %err, "window clause rejected");
                last_error = err;
            }
        }
    }
    Err(Error::QuerySyntax(last_error))
}

/// Count the rows `sql` would return.
///
/// `None` when the driver rejects the wrapping count query or returns
/// something that is not a count.
pub fn count_rows<C>(conn: &mut C, sql: &[u8]) -> Option<u64>
where
    C: Connection + ?Sized,
{
    let cursor = match conn.execute_query(&count_query(sql)) {
        Ok(cursor) => cursor,
        Err(err) => {
            debug!(error = %err, "count query rejected");
            return None;
        }
    };
    match cursor.first_value() {
        Some(value) => value.as_count(),
        None => Some(0),
    }
}

/// A page of rows plus the arithmetic used to fetch it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedResult {
    /// Rows of the current page.
    pub result: QueryResult,
    /// Resolved page position.
    pub pagination: Pagination,
    /// True when counting failed and the statement ran unpaged.
    pub degraded: bool,
}

/// Count `sql`, clamp the requested page, and fetch it.
///
/// When counting is unsupported the statement runs once without a
/// window and the full result is reported as a single page.
pub fn exec_paged<C>(
    conn: &mut C,
    sql: &[u8],
    request: PageRequest,
    charsets: &CharsetSettings,
) -> Result<PagedResult>
where
    C: Connection + ?Sized,
{
    let Some(total) = count_rows(conn, sql) else {
        let result = exec(conn, sql, charsets)?;
        let pagination = Pagination::single_page(result.row_count);
        return Ok(PagedResult {
            result,
            pagination,
            degraded: true,
        });
    };

    let pagination = request.resolve(total);
    let result = exec_page(conn, sql, pagination.page_size, pagination.offset, charsets)?;
    Ok(PagedResult {
        result,
        pagination,
        degraded: false,
    })
}
