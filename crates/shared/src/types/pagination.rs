//! Pagination types for list endpoints.

use serde::{Deserialize, Serialize};

/// Largest page size a caller may request.
pub const MAX_LIMIT: u32 = 100;

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Creates a page request, clamping page to at least 1 and limit to `1..=MAX_LIMIT`.
    #[must_use]
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_LIMIT),
        }
    }

    /// Returns a copy with out-of-range values clamped.
    #[must_use]
    pub fn normalized(self) -> Self {
        Self::new(self.page, self.limit)
    }

    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn limit(&self) -> u64 {
        u64::from(self.limit)
    }
}

/// Pagination metadata returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total number of matching items across all pages.
    pub total: u64,
    /// Current page number.
    pub page: u32,
    /// Total number of pages (`ceil(total / limit)`, zero when nothing matched).
    pub pages: u64,
}

impl Pagination {
    /// Builds pagination metadata for `request` given a total match count.
    #[must_use]
    pub fn new(request: PageRequest, total: u64) -> Self {
        let limit = request.limit().max(1);
        Self {
            total,
            page: request.page,
            pages: total.div_ceil(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_defaults() {
        let req = PageRequest::default();
        assert_eq!(req.page, 1);
        assert_eq!(req.limit, 10);
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let req: PageRequest = serde_json::from_str(r#"{"page": 3}"#).unwrap();
        assert_eq!(req, PageRequest { page: 3, limit: 10 });
    }

    #[rstest]
    #[case(0, 0, 1, 1)]
    #[case(2, 10, 2, 10)]
    #[case(1, 500, 1, MAX_LIMIT)]
    fn test_normalization(
        #[case] page: u32,
        #[case] limit: u32,
        #[case] expected_page: u32,
        #[case] expected_limit: u32,
    ) {
        let req = PageRequest { page, limit }.normalized();
        assert_eq!(req.page, expected_page);
        assert_eq!(req.limit, expected_limit);
    }

    #[test]
    fn test_offset_second_page() {
        assert_eq!(PageRequest::new(2, 10).offset(), 10);
    }

    #[rstest]
    #[case(25, 10, 3)]
    #[case(20, 10, 2)]
    #[case(1, 10, 1)]
    #[case(0, 10, 0)]
    fn test_page_count(#[case] total: u64, #[case] limit: u32, #[case] pages: u64) {
        let meta = Pagination::new(PageRequest::new(1, limit), total);
        assert_eq!(meta.pages, pages);
        assert_eq!(meta.total, total);
    }
}
