//! In-memory `ContactsApi` for controller tests

use async_trait::async_trait;
use pb_client::{
    Category, ClientError, Contact, ContactId, ContactInput, ContactPage, ContactsApi, ListRequest, Result,
    Statistics,
};
use std::collections::{BTreeMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(ListRequest),
    Get(ContactId),
    Create(ContactInput),
    Update(ContactId, ContactInput),
    Delete(ContactId),
    Statistics,
    FindByPhone(String),
    EmailExists(String, Option<ContactId>),
    PhoneExists(String, Option<ContactId>),
    DeleteMany(Vec<ContactId>),
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    list_delays: VecDeque<Duration>,
    list_failure: Option<ClientError>,
    save_failure: Option<ClientError>,
    delete_failure: Option<ClientError>,
    contacts: BTreeMap<ContactId, Contact>,
    statistics: Option<Statistics>,
    total_items: u64,
    total_pages: u32,
}

/// Answers every list request inside the page count with one contact named
/// `page N`, and with an empty page past the end
pub struct FakeApi {
    inner: Mutex<Inner>,
}

impl FakeApi {
    pub fn with_pages(total_items: u64, total_pages: u32) -> Self {
        Self {
            inner: Mutex::new(Inner {
                total_items,
                total_pages,
                ..Inner::default()
            }),
        }
    }

    /// Change the totals reported from the next list response on
    pub fn set_pages(&self, total_items: u64, total_pages: u32) {
        let mut inner = self.inner.lock().unwrap();
        inner.total_items = total_items;
        inner.total_pages = total_pages;
    }

    fn record(&self, call: Call) {
        self.inner.lock().unwrap().calls.push(call);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List(_)))
            .count()
    }

    pub fn last_list(&self) -> Option<ListRequest> {
        self.calls().into_iter().rev().find_map(|c| match c {
            Call::List(request) => Some(request),
            _ => None,
        })
    }

    /// Delay the next list response not already given a delay
    pub fn push_list_delay(&self, delay: Duration) {
        self.inner.lock().unwrap().list_delays.push_back(delay);
    }

    pub fn fail_list(&self, error: ClientError) {
        self.inner.lock().unwrap().list_failure = Some(error);
    }

    pub fn fail_save(&self, error: ClientError) {
        self.inner.lock().unwrap().save_failure = Some(error);
    }

    pub fn fail_delete(&self, error: ClientError) {
        self.inner.lock().unwrap().delete_failure = Some(error);
    }

    pub fn insert_contact(&self, contact: Contact) {
        self.inner
            .lock()
            .unwrap()
            .contacts
            .insert(contact.id, contact);
    }

    pub fn set_statistics(&self, statistics: Statistics) {
        self.inner.lock().unwrap().statistics = Some(statistics);
    }

    fn contact_from(id: ContactId, input: &ContactInput) -> Contact {
        let mut contact = Contact::new(id, input.name.clone(), input.phone_number.clone());
        contact.email = input.email.clone();
        contact.address = input.address.clone();
        contact.notes = input.notes.clone();
        if let Some(key) = &input.category {
            match key.parse::<Category>() {
                Ok(category) => contact.category = category,
                Err(_) => {
                    contact.category = Category::Other;
                    contact.unknown_category = Some(key.clone());
                }
            }
        }
        contact
    }

    fn in_use<F>(&self, exclude: Option<ContactId>, matches: F) -> bool
    where
        F: Fn(&Contact) -> bool,
    {
        self.inner
            .lock()
            .unwrap()
            .contacts
            .values()
            .any(|c| Some(c.id) != exclude && matches(c))
    }
}

#[async_trait]
impl ContactsApi for FakeApi {
    async fn list(&self, request: &ListRequest) -> Result<ContactPage> {
        self.record(Call::List(request.clone()));
        let (delay, failure, total_items, total_pages) = {
            let mut inner = self.inner.lock().unwrap();
            (
                inner.list_delays.pop_front(),
                inner.list_failure.clone(),
                inner.total_items,
                inner.total_pages,
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = failure {
            return Err(error);
        }

        let page = request.page();
        let contacts = if page < total_pages {
            vec![Contact::new(ContactId(i64::from(page) + 1), format!("page {}", page), "555")]
        } else {
            Vec::new()
        };
        Ok(ContactPage::new(contacts, page, total_items, total_pages))
    }

    async fn get(&self, id: ContactId) -> Result<Contact> {
        self.record(Call::Get(id));
        self.inner
            .lock()
            .unwrap()
            .contacts
            .get(&id)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(id.to_string()))
    }

    async fn create(&self, input: &ContactInput) -> Result<Contact> {
        self.record(Call::Create(input.clone()));
        if let Some(error) = self.inner.lock().unwrap().save_failure.clone() {
            return Err(error);
        }
        Ok(Self::contact_from(ContactId(100), input))
    }

    async fn update(&self, id: ContactId, input: &ContactInput) -> Result<Contact> {
        self.record(Call::Update(id, input.clone()));
        if let Some(error) = self.inner.lock().unwrap().save_failure.clone() {
            return Err(error);
        }
        Ok(Self::contact_from(id, input))
    }

    async fn delete(&self, id: ContactId) -> Result<()> {
        self.record(Call::Delete(id));
        match self.inner.lock().unwrap().delete_failure.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn statistics(&self) -> Result<Statistics> {
        self.record(Call::Statistics);
        Ok(self
            .inner
            .lock()
            .unwrap()
            .statistics
            .clone()
            .unwrap_or(Statistics {
                total: 0,
                categories: Vec::new(),
            }))
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Contact>> {
        self.record(Call::FindByPhone(phone_number.to_string()));
        Ok(self
            .inner
            .lock()
            .unwrap()
            .contacts
            .values()
            .find(|c| c.phone_number == phone_number)
            .cloned())
    }

    async fn email_exists(&self, email: &str, exclude: Option<ContactId>) -> Result<bool> {
        self.record(Call::EmailExists(email.to_string(), exclude));
        Ok(self.in_use(exclude, |c| c.email.as_deref() == Some(email)))
    }

    async fn phone_exists(&self, phone_number: &str, exclude: Option<ContactId>) -> Result<bool> {
        self.record(Call::PhoneExists(phone_number.to_string(), exclude));
        Ok(self.in_use(exclude, |c| c.phone_number == phone_number))
    }

    async fn delete_many(&self, ids: &[ContactId]) -> Result<String> {
        self.record(Call::DeleteMany(ids.to_vec()));
        if let Some(error) = self.inner.lock().unwrap().delete_failure.clone() {
            return Err(error);
        }
        Ok(format!("Deleted {} contacts", ids.len()))
    }
}
