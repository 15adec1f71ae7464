//! Data models for the contacts API

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Server-assigned contact identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl fmt::Display for ContactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ContactId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(ContactId)
    }
}

/// Contact category
///
/// Category names the server does not know about decode as [`Category::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Personal,
    Business,
    Family,
    Friend,
    #[serde(other)]
    Other,
}

impl Category {
    /// All categories in display order
    pub const ALL: [Category; 5] = [
        Category::Personal,
        Category::Business,
        Category::Family,
        Category::Friend,
        Category::Other,
    ];

    /// Wire name, also used in `/category/{name}` paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Business => "business",
            Self::Family => "family",
            Self::Friend => "friend",
            Self::Other => "other",
        }
    }

    /// Human readable name
    pub fn label(&self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Business => "Business",
            Self::Family => "Family",
            Self::Friend => "Friend",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == needle)
            .ok_or_else(|| UnknownCategory(s.trim().to_string()))
    }
}

/// Display label for a raw category key, falling back to the key itself
pub fn category_label(key: &str) -> String {
    match key.parse::<Category>() {
        Ok(category) => category.label().to_string(),
        Err(_) => key.to_string(),
    }
}

/// Contact record as returned by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawContact")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub category: Category,
    /// Server key this client has no variant for; `category` is `Other` then
    #[serde(skip_serializing)]
    pub unknown_category: Option<String>,
    pub notes: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContact {
    id: ContactId,
    name: String,
    phone_number: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    notes: Option<String>,
    #[serde(default)]
    created_at: Option<NaiveDateTime>,
    #[serde(default)]
    updated_at: Option<NaiveDateTime>,
}

impl From<RawContact> for Contact {
    fn from(raw: RawContact) -> Self {
        let (category, unknown_category) = match raw.category {
            Some(key) if !key.trim().is_empty() => match key.parse::<Category>() {
                Ok(category) => (category, None),
                Err(_) => (Category::Other, Some(key)),
            },
            _ => (Category::default(), None),
        };
        Self {
            id: raw.id,
            name: raw.name,
            phone_number: raw.phone_number,
            email: raw.email,
            address: raw.address,
            category,
            unknown_category,
            notes: raw.notes,
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }
}

impl Contact {
    /// Create a contact with the required fields only
    pub fn new(id: ContactId, name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            phone_number: phone_number.into(),
            email: None,
            address: None,
            category: Category::default(),
            unknown_category: None,
            notes: None,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self.unknown_category = None;
        self
    }

    /// Server key to send back for this contact's category
    pub fn category_key(&self) -> &str {
        self.unknown_category
            .as_deref()
            .unwrap_or(self.category.as_str())
    }

    pub fn category_label(&self) -> String {
        match &self.unknown_category {
            Some(key) => key.clone(),
            None => self.category.label().to_string(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Request body for create and update.
///
/// Absent optional fields are omitted from the JSON entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub name: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Server category key, usually a [`Category::as_str`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ContactInput {
    pub fn new(name: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone_number: phone_number.into(),
            email: None,
            address: None,
            category: None,
            notes: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category.as_str().to_string());
        self
    }

    pub fn with_category_key(mut self, key: impl Into<String>) -> Self {
        self.category = Some(key.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// One page of a listing, search or category query
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawContactPage")]
pub struct ContactPage {
    pub contacts: Vec<Contact>,
    pub current_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl ContactPage {
    /// Build a page, deriving the previous/next flags
    pub fn new(contacts: Vec<Contact>, current_page: u32, total_items: u64, total_pages: u32) -> Self {
        Self {
            contacts,
            current_page,
            total_items,
            total_pages,
            has_next: current_page.saturating_add(1) < total_pages,
            has_previous: current_page > 0,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), 0, 0, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

/// The server answers list endpoints with slightly different envelopes:
/// the paged listing uses Spring's `content`/`totalElements`/`number`, the
/// search and category endpoints use `contacts`/`totalItems`/`currentPage`,
/// and only some of them carry `hasNext`/`hasPrevious`.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawContactPage {
    #[serde(default, alias = "content")]
    contacts: Vec<Contact>,
    #[serde(default, alias = "number")]
    current_page: u32,
    #[serde(default, alias = "totalElements")]
    total_items: u64,
    #[serde(default)]
    total_pages: u32,
    #[serde(default)]
    has_next: Option<bool>,
    #[serde(default)]
    has_previous: Option<bool>,
}

impl From<RawContactPage> for ContactPage {
    fn from(raw: RawContactPage) -> Self {
        let derived = ContactPage::new(raw.contacts, raw.current_page, raw.total_items, raw.total_pages);
        Self {
            has_next: raw.has_next.unwrap_or(derived.has_next),
            has_previous: raw.has_previous.unwrap_or(derived.has_previous),
            ..derived
        }
    }
}

/// Aggregate counts from `/statistics`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "BTreeMap<String, u64>")]
pub struct Statistics {
    pub total: u64,
    /// `(category key, count)` with known categories first in display order
    pub categories: Vec<(String, u64)>,
}

impl Statistics {
    pub fn count(&self, key: &str) -> Option<u64> {
        self.categories
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, count)| *count)
    }
}

impl From<BTreeMap<String, u64>> for Statistics {
    fn from(mut map: BTreeMap<String, u64>) -> Self {
        let total = map.remove("total").unwrap_or(0);

        let mut categories = Vec::with_capacity(map.len());
        for category in Category::ALL {
            if let Some(count) = map.remove(category.as_str()) {
                categories.push((category.as_str().to_string(), count));
            }
        }
        // Whatever is left is a category this client has no variant for
        categories.extend(map);

        Self { total, categories }
    }
}
