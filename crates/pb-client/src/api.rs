//! The contacts API seam
//!
//! [`ContactsApi`] is what the directory controller talks to. The HTTP
//! implementation lives in [`crate::client`]; tests substitute fakes.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Category, Contact, ContactId, ContactInput, ContactPage, Statistics};

/// One of the three list request shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    /// `GET ?page=&size=`
    All { page: u32, size: u32 },
    /// `GET /search?keyword=&page=&size=`
    Search { keyword: String, page: u32, size: u32 },
    /// `GET /category/{category}?page=&size=`
    Category { category: Category, page: u32, size: u32 },
}

impl ListRequest {
    pub fn page(&self) -> u32 {
        match self {
            Self::All { page, .. } | Self::Search { page, .. } | Self::Category { page, .. } => *page,
        }
    }

    pub fn size(&self) -> u32 {
        match self {
            Self::All { size, .. } | Self::Search { size, .. } | Self::Category { size, .. } => *size,
        }
    }

    /// Path segments below the contacts base URL
    pub fn segments(&self) -> Vec<String> {
        match self {
            Self::All { .. } => Vec::new(),
            Self::Search { .. } => vec!["search".to_string()],
            Self::Category { category, .. } => {
                vec!["category".to_string(), category.as_str().to_string()]
            }
        }
    }

    /// Query parameters, unencoded
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(3);
        if let Self::Search { keyword, .. } = self {
            params.push(("keyword", keyword.clone()));
        }
        params.push(("page", self.page().to_string()));
        params.push(("size", self.size().to_string()));
        params
    }
}

/// Operations offered by the contacts REST API
#[async_trait]
pub trait ContactsApi: Send + Sync {
    /// Fetch one page for the given request shape
    async fn list(&self, request: &ListRequest) -> Result<ContactPage>;

    /// Fetch a single contact
    async fn get(&self, id: ContactId) -> Result<Contact>;

    async fn create(&self, input: &ContactInput) -> Result<Contact>;

    async fn update(&self, id: ContactId, input: &ContactInput) -> Result<Contact>;

    async fn delete(&self, id: ContactId) -> Result<()>;

    /// Total and per-category counts
    async fn statistics(&self) -> Result<Statistics>;

    /// Exact phone number lookup; `None` when nobody has that number
    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Contact>>;

    /// Whether another contact already uses `email`
    async fn email_exists(&self, email: &str, exclude: Option<ContactId>) -> Result<bool>;

    /// Whether another contact already uses `phone_number`
    async fn phone_exists(&self, phone_number: &str, exclude: Option<ContactId>) -> Result<bool>;

    /// Delete several contacts at once, returning the server's summary
    async fn delete_many(&self, ids: &[ContactId]) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_request_shapes() {
        let all = ListRequest::All { page: 2, size: 25 };
        assert!(all.segments().is_empty());
        assert_eq!(
            all.query(),
            vec![("page", "2".to_string()), ("size", "25".to_string())]
        );

        let search = ListRequest::Search {
            keyword: "li wei".to_string(),
            page: 0,
            size: 10,
        };
        assert_eq!(search.segments(), vec!["search"]);
        assert_eq!(search.query()[0], ("keyword", "li wei".to_string()));

        let category = ListRequest::Category {
            category: Category::Family,
            page: 1,
            size: 50,
        };
        assert_eq!(category.segments(), vec!["category", "family"]);
        assert_eq!(category.page(), 1);
        assert_eq!(category.size(), 50);
    }
}
