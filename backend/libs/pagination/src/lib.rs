//! Page/limit handling shared by every list operation
//!
//! Out-of-range input is clamped rather than rejected: a page below 1 becomes
//! 1 and a limit outside `1..=100` becomes 10.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: i32 = 1;
pub const DEFAULT_LIMIT: i32 = 10;
pub const MAX_LIMIT: i32 = 100;

/// Clamped page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: i32,
    limit: i32,
}

impl Pagination {
    pub fn new(page: i32, limit: i32) -> Self {
        let page = if page < 1 { DEFAULT_PAGE } else { page };
        let limit = if (1..=MAX_LIMIT).contains(&limit) {
            limit
        } else {
            DEFAULT_LIMIT
        };

        Self { page, limit }
    }

    pub fn page(&self) -> i32 {
        self.page
    }

    pub fn limit(&self) -> i32 {
        self.limit
    }

    /// Rows to skip, as SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    /// `ceil(total_count / limit)`; zero rows means zero pages
    pub fn total_pages(&self, total_count: i64) -> i32 {
        if total_count <= 0 {
            return 0;
        }
        let limit = i64::from(self.limit);
        let pages = (total_count + limit - 1) / limit;
        i32::try_from(pages).unwrap_or(i32::MAX)
    }

    /// Wrap one page of rows with its totals
    pub fn page_of<T>(&self, items: Vec<T>, total_count: i64) -> Page<T> {
        Page {
            items,
            total_count,
            page: self.page,
            total_pages: self.total_pages(total_count),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

/// Standard paginated response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page: i32,
    pub total_pages: i32,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page: self.page,
            total_pages: self.total_pages,
        }
    }
}
