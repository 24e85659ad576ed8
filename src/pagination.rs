//! Page/limit handling shared by the admin list endpoints

use serde::Serialize;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

pub fn default_page() -> i64 {
    1
}

pub fn default_limit() -> i64 {
    DEFAULT_LIMIT
}

/// Page clamped to >= 1 and limit to 1..=MAX_LIMIT
pub fn page_and_limit(page: i64, limit: i64) -> (i64, i64) {
    (page.max(1), limit.clamp(1, MAX_LIMIT))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }

    /// Rows to skip before this page
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// The slice of `items` shown on `page`
pub fn page_of<T>(items: Vec<T>, page: i64, limit: i64) -> (Vec<T>, Pagination) {
    let pagination = Pagination::new(page, limit, items.len() as i64);
    let shown = items
        .into_iter()
        .skip(pagination.offset() as usize)
        .take(limit as usize)
        .collect();
    (shown, pagination)
}
