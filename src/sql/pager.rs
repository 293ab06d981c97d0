//! SQL text builders and page arithmetic for counted, windowed queries.

use serde::Serialize;

/// Remove trailing whitespace and statement terminators.
///
/// Works on raw bytes: statements reach this point already encoded in the
/// connection charset, and every byte stripped here is ASCII.
pub fn strip_terminator(sql: &[u8]) -> &[u8] {
    let end = sql
        .iter()
        .rposition(|b| !matches!(*b, b' ' | b'\t' | b'\n' | b'\r' | b';'))
        .map_or(0, |idx| idx + 1);
    &sql[..end]
}

/// `SELECT COUNT(*) FROM (<sql>) t`
pub fn count_query(sql: &[u8]) -> Vec<u8> {
    wrap(b"SELECT COUNT(*) FROM (", sql, b") t")
}

fn wrap(prefix: &[u8], sql: &[u8], suffix: &[u8]) -> Vec<u8> {
    let body = strip_terminator(sql);
    let mut out = Vec::with_capacity(prefix.len() + body.len() + suffix.len());
    out.extend_from_slice(prefix);
    out.extend_from_slice(body);
    out.extend_from_slice(suffix);
    out
}

/// Row-window syntaxes, in the order they are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowClause {
    /// `OFFSET o ROWS FETCH NEXT n ROWS ONLY` (SQL:2008, DM, Oracle 12c+).
    OffsetFetch,
    /// `LIMIT n OFFSET o` (MySQL, PostgreSQL, SQLite).
    LimitOffset,
}

impl WindowClause {
    /// Attempt order.
    pub const FALLBACK_ORDER: [WindowClause; 2] =
        [WindowClause::OffsetFetch, WindowClause::LimitOffset];

    /// Render the clause for `limit` rows starting at `offset`.
    pub fn render(self, limit: u64, offset: u64) -> String {
        match self {
            WindowClause::OffsetFetch => {
                format!("OFFSET {offset} ROWS FETCH NEXT {limit} ROWS ONLY")
            }
            WindowClause::LimitOffset => format!("LIMIT {limit} OFFSET {offset}"),
        }
    }

    /// Render the clause for reading a table directly.
    ///
    /// The first page uses the shorter `FETCH FIRST` / bare `LIMIT` forms.
    pub fn render_for_table(self, limit: u64, offset: u64) -> String {
        match (self, offset) {
            (WindowClause::OffsetFetch, 0) => format!("FETCH FIRST {limit} ROWS ONLY"),
            (WindowClause::LimitOffset, 0) => format!("LIMIT {limit}"),
            _ => self.render(limit, offset),
        }
    }
}

/// `SELECT * FROM (<sql>) t <window>`
pub fn window_query(sql: &[u8], clause: WindowClause, limit: u64, offset: u64) -> Vec<u8> {
    let suffix = format!(") t {}", clause.render(limit, offset));
    wrap(b"SELECT * FROM (", sql, suffix.as_bytes())
}

/// A requested page; page and page size are both at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    page_size: u64,
}

impl PageRequest {
    /// Build a request, raising zero values to 1.
    pub fn new(page: u64, page_size: u64) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// 1-based page number.
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Clamp the request against a known total.
    pub fn resolve(self, total_rows: u64) -> Pagination {
        let total_pages = total_rows.div_ceil(self.page_size).max(1);
        let page = self.page.min(total_pages);
        Pagination {
            page,
            page_size: self.page_size,
            total_rows,
            total_pages,
            offset: (page - 1) * self.page_size,
        }
    }
}

/// A page resolved against the total row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    /// Current page, within `1..=total_pages`.
    pub page: u64,
    /// Rows per page.
    pub page_size: u64,
    /// Total rows of the unpaged statement.
    pub total_rows: u64,
    /// Number of pages, at least 1.
    pub total_pages: u64,
    /// Rows skipped before `page`.
    pub offset: u64,
}

impl Pagination {
    /// Single-page pagination for a result whose size is only known after fetching.
    pub fn single_page(row_count: u64) -> Self {
        Self {
            page: 1,
            page_size: row_count.max(1),
            total_rows: row_count,
            total_pages: 1,
            offset: 0,
        }
    }
}
