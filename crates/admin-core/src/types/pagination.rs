//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Default page size.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Maximum page size.
pub const MAX_PAGE_SIZE: u64 = 200;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Number of items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

impl PageRequest {
    /// Create a new page request, clamping out-of-range values.
    pub fn new(page: u64, page_size: u64) -> Self {
        let page_size = if page_size == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            page_size.min(MAX_PAGE_SIZE)
        };
        Self {
            page: page.max(1),
            page_size,
        }
    }

    /// Re-apply clamping to a deserialized request.
    pub fn normalized(&self) -> Self {
        Self::new(self.page, self.page_size)
    }

    /// Calculate the SQL `OFFSET` value.
    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) * self.page_size) as i64
    }

    /// Return the SQL `LIMIT` value.
    pub fn limit(&self) -> i64 {
        self.page_size as i64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Paginated response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T: Serialize> {
    /// The items on this page.
    pub items: Vec<T>,
    /// Current page number (1-based).
    pub page: u64,
    /// Number of items per page.
    pub page_size: u64,
    /// Total number of items across all pages.
    pub total_items: u64,
    /// Total number of pages.
    pub total_pages: u64,
}

impl<T: Serialize> PageResponse<T> {
    /// Create a new paginated response.
    pub fn new(items: Vec<T>, request: &PageRequest, total_items: u64) -> Self {
        let total_pages = if total_items == 0 {
            1
        } else {
            total_items.div_ceil(request.page_size)
        };
        Self {
            items,
            page: request.page,
            page_size: request.page_size,
            total_items,
            total_pages,
        }
    }

    /// Transform the items while keeping the paging metadata.
    pub fn map<U: Serialize>(self, f: impl FnMut(T) -> U) -> PageResponse<U> {
        PageResponse {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_clamped() {
        assert_eq!(PageRequest::new(0, 0).page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(PageRequest::new(0, 0).page, 1);
        assert_eq!(PageRequest::new(1, 5000).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_offset_and_total_pages() {
        let req = PageRequest::new(3, 20);
        assert_eq!(req.offset(), 40);
        let page = PageResponse::new(vec![1, 2, 3], &req, 41);
        assert_eq!(page.total_pages, 3);
        let empty: PageResponse<i32> = PageResponse::new(vec![], &req, 0);
        assert_eq!(empty.total_pages, 1);
    }
}
