//! Paginated listings.

use serde::{Deserialize, Serialize};

/// One page of a listing as returned by `/{resource}/pagination` and
/// `/{resource}/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    /// Items on this page.
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,

    /// Items across all pages.
    #[serde(default)]
    pub total_count: u64,

    /// Number of pages.
    #[serde(default)]
    pub total_pages: u64,

    /// 1-based page number.
    #[serde(default)]
    pub page_number: u32,

    /// Requested page size.
    #[serde(default)]
    pub page_size: u32,
}

impl<T> PaginatedResult<T> {
    /// Build a page, deriving `total_pages`. Extra items beyond `page_size`
    /// are dropped.
    pub fn new(mut items: Vec<T>, total_count: u64, page_number: u32, page_size: u32) -> Self {
        items.truncate(page_size as usize);
        Self {
            items,
            total_count,
            total_pages: total_pages(total_count, page_size),
            page_number,
            page_size,
        }
    }

    /// Whether a later page exists.
    pub fn has_next_page(&self) -> bool {
        u64::from(self.page_number) < self.total_pages
    }

    /// Whether an earlier page exists.
    pub fn has_previous_page(&self) -> bool {
        self.page_number > 1
    }

    /// Whether this page holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Convert items, keeping the page metadata.
    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> PaginatedResult<U> {
        PaginatedResult {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            total_pages: self.total_pages,
            page_number: self.page_number,
            page_size: self.page_size,
        }
    }
}

/// `ceil(total_count / page_size)`; zero when `page_size` is zero.
pub fn total_pages(total_count: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_count.div_ceil(u64::from(page_size))
}

/// Page selection shared by filter types; flatten it into a filter struct.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_number: Option<u32>,

    /// Items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

impl PageRequest {
    /// Request a specific page.
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: Some(page_number),
            page_size: Some(page_size),
        }
    }
}
