//! Pagination query parameter extractor.

use serde::{Deserialize, Serialize};

use admin_core::types::pagination::{DEFAULT_PAGE_SIZE, PageRequest};

/// Query parameters for paginated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Page number (1-based, default: 1).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page (default: 10, max: 200).
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    DEFAULT_PAGE_SIZE
}

impl PaginationParams {
    /// Converts to a clamped `PageRequest`.
    pub fn into_page_request(self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }
}

#[cfg(test)]
mod tests {
    use admin_core::types::pagination::MAX_PAGE_SIZE;

    use super::*;

    #[test]
    fn test_oversized_page_is_clamped() {
        let req = PaginationParams {
            page: 0,
            page_size: 10_000,
        }
        .into_page_request();
        assert_eq!(req.page, 1);
        assert_eq!(req.page_size, MAX_PAGE_SIZE);
    }
}
