//! Pagination primitives shared by repositories, services and responses.

use serde::{Deserialize, Serialize};

/// Items returned per page when a caller does not ask for a specific size.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Requested page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// 1-based page number.
    pub page: usize,
    /// Number of items per page.
    pub per_page: usize,
}

/// A single page of results along with paging position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// 1-based page number of this slice.
    pub page: usize,
    /// Total number of pages available.
    pub pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, page: usize, pages: usize) -> Self {
        Self { items, page, pages }
    }
}
