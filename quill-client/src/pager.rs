/// Pagination state for a list screen. Pages are 1-based; whether a next
/// page exists is inferred from the current page coming back full, which is
/// all an offset-paginated API tells us.
#[derive(Debug, Clone)]
pub struct Pager {
    page: u32,
    page_size: usize,
    last_len: Option<usize>,
}

pub const DEFAULT_PAGE_SIZE: usize = 10;

impl Default for Pager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Pager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size,
            last_len: None,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn offset(&self) -> usize {
        (self.page as usize - 1) * self.page_size
    }

    /// Feed back how many items the current page returned.
    pub fn record(&mut self, returned: usize) {
        self.last_len = Some(returned);
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Enabled only when the current page came back full.
    pub fn has_next(&self) -> bool {
        self.last_len == Some(self.page_size)
    }

    /// Advances if the next affordance is enabled. Only the page index
    /// moves; filters and scope held elsewhere are untouched.
    pub fn next(&mut self) -> bool {
        if self.has_next() {
            self.page += 1;
            self.last_len = None;
            true
        } else {
            false
        }
    }

    pub fn prev(&mut self) -> bool {
        if self.has_prev() {
            self.page -= 1;
            self.last_len = None;
            true
        } else {
            false
        }
    }
}
