//! Pagination cursor for the event directory.

use serde::{Deserialize, Serialize};

/// Default page size used by the directory
pub const DEFAULT_PAGE_SIZE: u32 = 6;

/// Position within a paginated result set
///
/// Pages are 1-based. Invariant: `current_page` lies in
/// `[1, total_pages]` whenever `total_pages >= 1`; requests outside that
/// range are clamped before any fetch is issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCursor {
    /// Current page, 1-based
    pub current_page: u32,
    /// Requested page size
    pub page_size: u32,
    /// Total pages matching the current filters
    pub total_pages: u32,
    /// Total items matching the current filters
    pub total_events: u64,
    /// Whether a later page exists
    pub has_more: bool,
}

impl PageCursor {
    /// Cursor for an empty, unfetched directory
    #[must_use]
    pub const fn initial(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size,
            total_pages: 1,
            total_events: 0,
            has_more: false,
        }
    }

    /// Clamp a requested page into the valid range
    ///
    /// Returns 1 when the result set is empty.
    #[must_use]
    pub const fn clamp_page(&self, requested: u32) -> u32 {
        if self.total_pages == 0 {
            return 1;
        }
        if requested < 1 {
            1
        } else if requested > self.total_pages {
            self.total_pages
        } else {
            requested
        }
    }
}

impl Default for PageCursor {
    fn default() -> Self {
        Self::initial(DEFAULT_PAGE_SIZE)
    }
}
