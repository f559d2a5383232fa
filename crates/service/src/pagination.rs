//! Pagination utilities for service layer
//!
//! Provides a simple `Pagination` struct and helpers to normalize inputs.

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    /// items per page
    pub per_page: u32,
}

impl Pagination {
    /// Clamp to sane defaults and convert to `(page_index, per_page)`
    pub fn normalize(self) -> (usize, usize) {
        let page = if self.page == 0 { 1 } else { self.page };
        let per_page = self.per_page.clamp(1, 100);
        ((page - 1) as usize, per_page as usize)
    }

    /// Take the requested page out of an already filtered sequence.
    pub fn slice<T>(self, items: Vec<T>) -> Vec<T> {
        let (page_idx, per_page) = self.normalize();
        items.into_iter().skip(page_idx.saturating_mul(per_page)).take(per_page).collect()
    }
}

impl Default for Pagination {
    fn default() -> Self { Self { page: 1, per_page: 10 } }
}

/// One page of results plus the number of matches before slicing.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}
