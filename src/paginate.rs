use serde::Serialize;

/// Page arithmetic for one list request.
///
/// An empty result still has exactly one (empty) page. Asking for a page
/// past the last one is a normal state, reported by [`is_out_of_range`],
/// never an error.
///
/// [`is_out_of_range`]: Pagination::is_out_of_range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total_rows: u64,
    pub total_pages: u64,
}

impl Pagination {
    /// `page_size` and `page` below 1 are raised to 1.
    pub fn new(total_rows: u64, page_size: u32, page: u32) -> Self {
        let limit = page_size.max(1);
        let total_pages = if total_rows == 0 {
            1
        } else {
            total_rows.div_ceil(u64::from(limit))
        };
        Self {
            page: page.max(1),
            limit,
            total_rows,
            total_pages,
        }
    }

    /// Rows to skip before the requested page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    pub fn is_out_of_range(&self) -> bool {
        u64::from(self.page) > self.total_pages
    }
}
