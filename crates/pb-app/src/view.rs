//! View models
//!
//! Pure functions from API data to displayable structures. Nothing here
//! knows how the result is drawn.

use chrono::NaiveDateTime;
use pb_client::{category_label, Category, Contact, ContactId, ContactPage, Statistics};

use crate::list::ListQuery;

/// Timestamp format used on contact cards
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M";

/// Pages shown either side of the current one
const PAGE_WINDOW: u32 = 2;

pub const EMPTY_TITLE: &str = "No contacts yet";
pub const EMPTY_HINT: &str = "Use /add to create your first contact";

fn format_time(time: Option<NaiveDateTime>) -> Option<String> {
    time.map(|t| t.format(DATE_FORMAT).to_string())
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.trim().is_empty()).cloned()
}

/// One contact as shown in the list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactCard {
    pub id: ContactId,
    pub name: String,
    pub phone_number: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub category: Category,
    pub category_label: String,
    pub created: Option<String>,
    /// Only set when the contact changed after it was created
    pub updated: Option<String>,
}

impl From<&Contact> for ContactCard {
    fn from(contact: &Contact) -> Self {
        let updated = if contact.updated_at != contact.created_at {
            format_time(contact.updated_at)
        } else {
            None
        };

        Self {
            id: contact.id,
            name: contact.name.clone(),
            phone_number: contact.phone_number.clone(),
            email: non_blank(&contact.email),
            address: non_blank(&contact.address),
            notes: non_blank(&contact.notes),
            category: contact.category,
            category_label: contact.category_label(),
            created: format_time(contact.created_at),
            updated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageButton {
    /// Zero-based page index
    Page { index: u32, current: bool },
    /// Skipped pages
    Gap,
}

impl PageButton {
    pub fn label(&self) -> String {
        match self {
            Self::Page { index, .. } => (index + 1).to_string(),
            Self::Gap => "...".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub first_item: u64,
    pub last_item: u64,
    pub total_items: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub buttons: Vec<PageButton>,
}

impl PaginationView {
    /// `None` when everything fits on one page
    pub fn build(current: u32, page_size: u32, page: &ContactPage) -> Option<Self> {
        let total_pages = page.total_pages;
        if total_pages <= 1 {
            return None;
        }

        let size = u64::from(page_size);
        let first_item = u64::from(current) * size + 1;
        let last_item = ((u64::from(current) + 1) * size).min(page.total_items);

        let last_page = total_pages - 1;
        let start = current.saturating_sub(PAGE_WINDOW);
        let end = current.saturating_add(PAGE_WINDOW).min(last_page);

        let mut buttons = Vec::new();
        if start > 0 {
            buttons.push(PageButton::Page {
                index: 0,
                current: false,
            });
            if start > 1 {
                buttons.push(PageButton::Gap);
            }
        }
        for index in start..=end {
            buttons.push(PageButton::Page {
                index,
                current: index == current,
            });
        }
        if end < last_page {
            if end + 1 < last_page {
                buttons.push(PageButton::Gap);
            }
            buttons.push(PageButton::Page {
                index: last_page,
                current: false,
            });
        }

        Some(Self {
            first_item,
            last_item,
            total_items: page.total_items,
            has_previous: page.has_previous,
            has_next: page.has_next,
            buttons,
        })
    }

    pub fn range_text(&self) -> String {
        format!(
            "Showing {}-{} of {} contacts",
            self.first_item, self.last_item, self.total_items
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListBody {
    /// Placeholder instead of an empty list
    Empty,
    Cards(Vec<ContactCard>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub body: ListBody,
    pub pagination: Option<PaginationView>,
    pub total_items: u64,
}

impl ListView {
    pub fn build(page: &ContactPage, query: &ListQuery) -> Self {
        let body = if page.contacts.is_empty() {
            ListBody::Empty
        } else {
            ListBody::Cards(page.contacts.iter().map(ContactCard::from).collect())
        };

        Self {
            body,
            pagination: PaginationView::build(query.page(), query.page_size(), page),
            total_items: page.total_items,
        }
    }

    pub fn count_line(&self) -> String {
        format!("Total: {} contacts", self.total_items)
    }

    pub fn cards(&self) -> &[ContactCard] {
        match &self.body {
            ListBody::Empty => &[],
            ListBody::Cards(cards) => cards,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryShare {
    pub key: String,
    pub label: String,
    pub count: u64,
    /// 0.0 when the total is zero
    pub percent: f64,
    pub percent_text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatisticsView {
    pub total: u64,
    pub shares: Vec<CategoryShare>,
}

impl StatisticsView {
    pub fn build(stats: &Statistics) -> Self {
        let total = stats.total;
        let shares = stats
            .categories
            .iter()
            .map(|(key, count)| {
                let (percent, percent_text) = if total > 0 {
                    let percent = *count as f64 * 100.0 / total as f64;
                    (percent, format!("{:.1}", percent))
                } else {
                    (0.0, "0".to_string())
                };
                CategoryShare {
                    key: key.clone(),
                    label: category_label(key),
                    count: *count,
                    percent,
                    percent_text,
                }
            })
            .collect();

        Self { total, shares }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn labels(view: &PaginationView) -> Vec<String> {
        view.buttons.iter().map(PageButton::label).collect()
    }

    fn page_of(current: u32, total_items: u64, total_pages: u32) -> ContactPage {
        ContactPage::new(Vec::new(), current, total_items, total_pages)
    }

    #[test]
    fn test_card_hides_unchanged_update_time() {
        let mut contact = Contact::new(ContactId(1), "Alice", "555").with_email("");
        contact.created_at = Some(at(9, 30));
        contact.updated_at = Some(at(9, 30));

        let card = ContactCard::from(&contact);
        assert_eq!(card.created.as_deref(), Some("2024/03/01 09:30"));
        assert_eq!(card.updated, None);
        assert_eq!(card.email, None, "blank email is not shown");
        assert_eq!(card.category_label, "Personal");

        contact.updated_at = Some(at(10, 5));
        let card = ContactCard::from(&contact);
        assert_eq!(card.updated.as_deref(), Some("2024/03/01 10:05"));
    }

    #[test]
    fn test_card_shows_raw_unknown_category() {
        let mut contact = Contact::new(ContactId(2), "Dan", "555");
        contact.category = Category::Other;
        contact.unknown_category = Some("colleague".to_string());
        assert_eq!(ContactCard::from(&contact).category_label, "colleague");
    }

    #[test]
    fn test_empty_list_placeholder() {
        let query = ListQuery::new(10);
        let view = ListView::build(&ContactPage::empty(), &query);
        assert_eq!(view.body, ListBody::Empty);
        assert!(view.pagination.is_none());
        assert!(view.cards().is_empty());
        assert_eq!(view.count_line(), "Total: 0 contacts");
    }

    #[test]
    fn test_single_page_has_no_pagination() {
        assert!(PaginationView::build(0, 10, &page_of(0, 7, 1)).is_none());
    }

    #[test]
    fn test_pagination_window_middle() {
        let view = PaginationView::build(5, 10, &page_of(5, 100, 10)).unwrap();
        assert_eq!(
            labels(&view),
            vec!["1", "...", "4", "5", "6", "7", "8", "...", "10"]
        );
        assert!(view.buttons.contains(&PageButton::Page {
            index: 5,
            current: true
        }));
        assert_eq!(view.range_text(), "Showing 51-60 of 100 contacts");
    }

    #[test]
    fn test_pagination_window_edges() {
        let view = PaginationView::build(0, 10, &page_of(0, 45, 5)).unwrap();
        assert_eq!(labels(&view), vec!["1", "2", "3", "...", "5"]);
        assert!(!view.has_previous);
        assert!(view.has_next);

        // No gap when the window touches the neighbour of the first page
        let view = PaginationView::build(3, 10, &page_of(3, 45, 5)).unwrap();
        assert_eq!(labels(&view), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(view.range_text(), "Showing 31-40 of 45 contacts");

        let view = PaginationView::build(4, 10, &page_of(4, 45, 5)).unwrap();
        assert_eq!(view.last_item, 45);
        assert!(!view.has_next);
    }

    #[test]
    fn test_statistics_percentages() {
        let stats = Statistics {
            total: 3,
            categories: vec![("personal".to_string(), 2), ("friend".to_string(), 1)],
        };
        let view = StatisticsView::build(&stats);
        assert_eq!(view.shares[0].percent_text, "66.7");
        assert_eq!(view.shares[1].percent_text, "33.3");
        assert_eq!(view.shares[1].label, "Friend");
    }

    #[test]
    fn test_statistics_zero_total() {
        let stats = Statistics {
            total: 0,
            categories: vec![("personal".to_string(), 0), ("colleague".to_string(), 0)],
        };
        let view = StatisticsView::build(&stats);
        for share in &view.shares {
            assert_eq!(share.percent, 0.0);
            assert_eq!(share.percent_text, "0");
        }
        assert_eq!(view.shares[1].label, "colleague");
    }
}
