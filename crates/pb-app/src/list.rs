//! List query state
//!
//! Every operation that changes what the list shows returns the
//! [`ListRequest`] to issue, or `None` when the change is a no-op and no
//! request must be sent.

use pb_client::{Category, ContactPage, ListRequest};
use pb_core::PAGE_SIZES;

/// Page, page size and filters of the contact list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    page: u32,
    page_size: u32,
    keyword: Option<String>,
    category: Option<Category>,
    /// Page count from the last applied response
    total_pages: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(PAGE_SIZES[0])
    }
}

impl ListQuery {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 0,
            page_size,
            keyword: None,
            category: None,
            total_pages: 0,
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    pub fn category(&self) -> Option<Category> {
        self.category
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn is_filtered(&self) -> bool {
        self.keyword.is_some() || self.category.is_some()
    }

    /// The request for the current state.
    ///
    /// A keyword wins over a category, so at most one filter is ever sent.
    pub fn request(&self) -> ListRequest {
        let (page, size) = (self.page, self.page_size);
        match (&self.keyword, self.category) {
            (Some(keyword), _) => ListRequest::Search {
                keyword: keyword.clone(),
                page,
                size,
            },
            (None, Some(category)) => ListRequest::Category {
                category,
                page,
                size,
            },
            (None, None) => ListRequest::All { page, size },
        }
    }

    /// Set the keyword. Surrounding whitespace is dropped and a blank
    /// keyword removes the filter.
    pub fn search(&mut self, keyword: &str) -> ListRequest {
        let keyword = keyword.trim();
        self.keyword = (!keyword.is_empty()).then(|| keyword.to_string());
        self.page = 0;
        self.request()
    }

    pub fn filter_category(&mut self, category: Option<Category>) -> ListRequest {
        self.category = category;
        self.page = 0;
        self.request()
    }

    /// Change the page size; sizes outside [`PAGE_SIZES`] are ignored
    pub fn set_page_size(&mut self, size: u32) -> Option<ListRequest> {
        if !PAGE_SIZES.contains(&size) {
            return None;
        }
        self.page_size = size;
        self.page = 0;
        Some(self.request())
    }

    /// Jump to `page`. Pages outside `[0, total_pages)` and the current
    /// page are no-ops.
    pub fn change_page(&mut self, page: u32) -> Option<ListRequest> {
        if page >= self.total_pages || page == self.page {
            return None;
        }
        self.page = page;
        Some(self.request())
    }

    pub fn next_page(&mut self) -> Option<ListRequest> {
        self.change_page(self.page.checked_add(1)?)
    }

    pub fn previous_page(&mut self) -> Option<ListRequest> {
        self.change_page(self.page.checked_sub(1)?)
    }

    /// Drop both filters and go back to the first page
    pub fn clear_filters(&mut self) -> ListRequest {
        self.keyword = None;
        self.category = None;
        self.page = 0;
        self.request()
    }

    /// Record the page count of a response
    pub fn apply(&mut self, page: &ContactPage) {
        self.total_pages = page.total_pages;
    }

    /// Move back to the last page when the current one no longer exists,
    /// e.g. after deleting the only contact on the last page.
    pub fn clamp_page(&mut self) -> Option<ListRequest> {
        if self.page == 0 || self.page < self.total_pages {
            return None;
        }
        self.page = self.total_pages.saturating_sub(1);
        Some(self.request())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_with_pages(total_pages: u32) -> ListQuery {
        let mut query = ListQuery::new(10);
        query.apply(&ContactPage::new(Vec::new(), 0, u64::from(total_pages) * 10, total_pages));
        query
    }

    #[test]
    fn test_default_request() {
        let query = ListQuery::default();
        assert_eq!(query.request(), ListRequest::All { page: 0, size: 10 });
        assert!(!query.is_filtered());
    }

    #[test]
    fn test_keyword_resets_page_and_wins_over_category() {
        let mut query = query_with_pages(5);
        query.filter_category(Some(Category::Business));
        query.change_page(3).unwrap();
        assert_eq!(query.page(), 3);

        let request = query.search("  alice ");
        assert_eq!(query.page(), 0);
        assert_eq!(
            request,
            ListRequest::Search {
                keyword: "alice".to_string(),
                page: 0,
                size: 10,
            }
        );
        // The category is kept but not sent
        assert_eq!(query.category(), Some(Category::Business));
    }

    #[test]
    fn test_blank_keyword_falls_back_to_category() {
        let mut query = ListQuery::new(25);
        query.filter_category(Some(Category::Family));
        query.search("bob");

        let request = query.search("   ");
        assert_eq!(query.keyword(), None);
        assert_eq!(
            request,
            ListRequest::Category {
                category: Category::Family,
                page: 0,
                size: 25,
            }
        );
    }

    #[test]
    fn test_category_change_resets_page() {
        let mut query = query_with_pages(4);
        query.change_page(2);
        query.filter_category(Some(Category::Friend));
        assert_eq!(query.page(), 0);
    }

    #[test]
    fn test_change_page_bounds() {
        let mut query = query_with_pages(3);

        assert!(query.change_page(3).is_none());
        assert!(query.change_page(0).is_none(), "current page is a no-op");
        assert_eq!(query.page(), 0);

        assert_eq!(query.change_page(2), Some(ListRequest::All { page: 2, size: 10 }));
        assert!(query.next_page().is_none());
        assert_eq!(query.previous_page(), Some(ListRequest::All { page: 1, size: 10 }));
    }

    #[test]
    fn test_no_pages_known_yet() {
        let mut query = ListQuery::new(10);
        assert!(query.change_page(1).is_none());
        assert!(query.previous_page().is_none());
        assert!(query.next_page().is_none());
    }

    #[test]
    fn test_page_size() {
        let mut query = query_with_pages(6);
        query.change_page(4);

        assert!(query.set_page_size(30).is_none());
        assert_eq!(query.page(), 4);

        assert_eq!(
            query.set_page_size(50),
            Some(ListRequest::All { page: 0, size: 50 })
        );
        assert_eq!(query.page_size(), 50);
    }

    #[test]
    fn test_clamp_page_after_last_page_shrinks() {
        let mut query = query_with_pages(3);
        query.change_page(2);
        assert_eq!(query.clamp_page(), None);

        query.apply(&ContactPage::new(Vec::new(), 2, 20, 2));
        assert_eq!(query.clamp_page(), Some(ListRequest::All { page: 1, size: 10 }));
        assert_eq!(query.page(), 1);

        // Nothing left at all
        query.apply(&ContactPage::new(Vec::new(), 1, 0, 0));
        assert_eq!(query.clamp_page(), Some(ListRequest::All { page: 0, size: 10 }));
        assert_eq!(query.clamp_page(), None);
    }

    #[test]
    fn test_clear_filters() {
        let mut query = query_with_pages(3);
        query.filter_category(Some(Category::Other));
        query.search("x");
        query.change_page(1);

        let request = query.clear_filters();
        assert_eq!(request, ListRequest::All { page: 0, size: 10 });
        assert!(!query.is_filtered());
    }
}
