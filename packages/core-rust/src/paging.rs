//! Page requests and page results for list operations.

use serde::{Deserialize, Serialize};

/// A request for one page of entities, ordered by id.
///
/// Pages are 1-based. A page or size of zero is treated as one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    #[must_use]
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
        }
    }

    /// Same request with `size` capped at `max_size`.
    #[must_use]
    pub fn clamped(self, max_size: u32) -> Self {
        Self::new(self.page, self.size.min(max_size.max(1)))
    }

    /// Number of entities preceding this page.
    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.size as usize
    }
}

/// One page of results plus the total number of matching entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page,
            size: request.size,
            total,
        }
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.size))
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_page_and_size_are_normalised() {
        let req = PageRequest::new(0, 0);
        assert_eq!(req, PageRequest { page: 1, size: 1 });
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn clamping_caps_size() {
        let req = PageRequest::new(3, 500).clamped(200);
        assert_eq!(req.size, 200);
        assert_eq!(req.offset(), 400);
    }

    #[test]
    fn page_counts() {
        let page = Page::new(vec![1, 2], PageRequest::new(2, 2), 5);
        assert_eq!(page.total_pages(), 3);
        assert!(page.has_next());

        let last = Page::new(vec![5], PageRequest::new(3, 2), 5);
        assert!(!last.has_next());

        let empty: Page<u8> = Page::new(Vec::new(), PageRequest::new(1, 10), 0);
        assert_eq!(empty.total_pages(), 0);
        assert!(!empty.has_next());
    }
}
