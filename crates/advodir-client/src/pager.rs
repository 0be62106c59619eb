//! Page cursor for browsing a search.

use advodir_core::{SearchRequest, SearchResponse};

/// Tracks the current page and search term, bounded by the page count of the
/// last response seen.
#[derive(Debug, Clone)]
pub struct Pager {
    request: SearchRequest,
    total_pages: u64,
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            request: SearchRequest::new(SearchRequest::DEFAULT_PAGE, page_size, ""),
            total_pages: 0,
        }
    }

    /// The request for the current position.
    pub fn request(&self) -> &SearchRequest {
        &self.request
    }

    pub fn page(&self) -> u64 {
        self.request.page()
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    /// Record the totals from a response to the current request.
    pub fn observe(&mut self, response: &SearchResponse) {
        self.total_pages = response.total_pages;
    }

    /// Change the search term. A different term starts again at page 1 and
    /// forgets the known page count.
    pub fn set_search(&mut self, search: &str) {
        if search == self.request.search() {
            return;
        }
        self.request = SearchRequest::new(
            SearchRequest::DEFAULT_PAGE,
            self.request.page_size(),
            search,
        );
        self.total_pages = 0;
    }

    pub fn has_next(&self) -> bool {
        self.page() < self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page() > 1
    }

    /// Advance one page if the last response says there is one.
    pub fn next(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.request = self.request.with_page(self.page() + 1);
        true
    }

    pub fn previous(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.request = self.request.with_page(self.page() - 1);
        true
    }
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(SearchRequest::DEFAULT_PAGE_SIZE)
    }
}
