use serde::Serialize;

/// Page coordinates requested by a client, already normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub per_page: i64,
}

impl PageRequest {
    /// Normalizes raw query parameters. Missing values fall back to the
    /// first page of 100; zero or negative pages snap to 1 and per_page
    /// is capped at 1000 so a single request cannot drain the table.
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            per_page: per_page.unwrap_or(100).clamp(1, 1000),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.per_page
    }

    /// Pairs the request with the total row count to tell clients
    /// whether another page exists.
    pub fn context(&self, total: i64) -> PageContext {
        PageContext {
            page: self.page,
            per_page: self.per_page,
            has_more_page: self.page * self.per_page < total,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageContext {
    pub page: i64,
    pub per_page: i64,
    pub has_more_page: bool,
}
