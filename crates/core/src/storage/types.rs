use serde::{Deserialize, Serialize};

/// One page of a collection.
///
/// `results` is always `data.len()` and never exceeds `limit`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedResult<T> {
    /// 1-based page number.
    pub page: usize,
    pub limit: usize,
    /// Number of items across the entire collection.
    pub total: usize,
    /// Number of items in this page.
    pub results: usize,
    pub data: Vec<T>,
}

impl<T> PaginatedResult<T> {
    /// Builds a page, deriving `results` from `data`.
    pub fn new(page: usize, limit: usize, total: usize, data: Vec<T>) -> Self {
        Self {
            page,
            limit,
            total,
            results: data.len(),
            data,
        }
    }
}

/// Number of items to skip before the given 1-based page.
///
/// Page 0 is treated like page 1.
pub fn page_offset(page: usize, limit: usize) -> usize {
    page.saturating_sub(1).saturating_mul(limit)
}
