//! Directory controller
//!
//! Owns the list query, the form, the delete prompt, the statistics view
//! and the notification slot, and turns user actions into API calls.
//!
//! Each action issues at most one list request. List requests carry a
//! generation ticket; a response whose ticket is no longer the newest is
//! dropped so it cannot overwrite fresher data. No lock is held while a
//! request is in flight.

use pb_client::{Category, ContactId, ContactsApi, ListRequest};
use pb_core::Config;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, oneshot};
use tracing::{debug, info, warn};

use crate::debounce::Debouncer;
use crate::delete::DeletePrompt;
use crate::form::{ContactForm, FormFields, FormMode};
use crate::list::ListQuery;
use crate::notify::{Notification, Notifier, Severity};
use crate::view::{ContactCard, ListView, StatisticsView};

const LOAD_FAILED: &str = "Failed to load contacts";
const FETCH_FAILED: &str = "Failed to load contact details";
const SAVE_FAILED: &str = "Failed to save contact";
const DELETE_FAILED: &str = "Failed to delete contact";
const STATISTICS_FAILED: &str = "Failed to load statistics";
const LOOKUP_FAILED: &str = "Phone number lookup failed";

/// Tunables taken from the `[ui]` config section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorySettings {
    pub page_size: u32,
    pub search_debounce: Duration,
    pub notification_duration: Duration,
}

impl Default for DirectorySettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for DirectorySettings {
    fn from(config: &Config) -> Self {
        Self {
            page_size: config.ui.page_size,
            search_debounce: config.search_debounce(),
            notification_duration: config.notification_duration(),
        }
    }
}

/// What became of a user action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The action took effect
    Done,
    /// Nothing to do: no-op change, closed form, or a duplicate submit
    Ignored,
    /// The action failed and an error notification is showing
    Failed,
    /// A newer list request superseded this one
    Stale,
}

struct State {
    query: ListQuery,
    view: Option<ListView>,
    form: ContactForm,
    delete: DeletePrompt,
    statistics: Option<StatisticsView>,
    notifier: Notifier,
}

/// Held while a save or delete is in flight; clears the flag on drop
struct BusyGuard<'a>(&'a AtomicBool);

impl<'a> BusyGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Counts list fetches in flight for the loading indicator
struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn new(count: &'a AtomicUsize) -> Self {
        count.fetch_add(1, Ordering::AcqRel);
        Self(count)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct Directory {
    api: Arc<dyn ContactsApi>,
    state: Mutex<State>,
    generation: AtomicU64,
    loading: AtomicUsize,
    saving: AtomicBool,
    deleting: AtomicBool,
    debouncer: Debouncer,
}

impl Directory {
    pub fn new(api: Arc<dyn ContactsApi>, settings: DirectorySettings) -> Self {
        Self {
            api,
            state: Mutex::new(State {
                query: ListQuery::new(settings.page_size),
                view: None,
                form: ContactForm::closed(),
                delete: DeletePrompt::default(),
                statistics: None,
                notifier: Notifier::new(settings.notification_duration),
            }),
            generation: AtomicU64::new(0),
            loading: AtomicUsize::new(0),
            saving: AtomicBool::new(false),
            deleting: AtomicBool::new(false),
            debouncer: Debouncer::new(settings.search_debounce),
        }
    }

    // ------------------------------------------------------------------
    // Snapshots
    // ------------------------------------------------------------------

    pub async fn query(&self) -> ListQuery {
        self.state.lock().await.query.clone()
    }

    pub async fn view(&self) -> Option<ListView> {
        self.state.lock().await.view.clone()
    }

    pub async fn form(&self) -> ContactForm {
        self.state.lock().await.form.clone()
    }

    pub async fn pending_delete(&self) -> Option<ContactId> {
        self.state.lock().await.delete.target()
    }

    pub async fn statistics(&self) -> Option<StatisticsView> {
        self.state.lock().await.statistics.clone()
    }

    /// The notification currently on screen, if any
    pub async fn notification(&self) -> Option<Notification> {
        self.state.lock().await.notifier.visible().cloned()
    }

    /// Every notification raised since the last call, including ones whose
    /// display time ran out while an action was still reloading the list
    pub async fn take_notifications(&self) -> Vec<Notification> {
        self.state.lock().await.notifier.take_unread()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire) > 0
    }

    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting.load(Ordering::Acquire)
    }

    async fn notify(&self, message: impl Into<String>, severity: Severity) {
        self.state.lock().await.notifier.show(message, severity);
    }

    // ------------------------------------------------------------------
    // List, filters and pagination
    // ------------------------------------------------------------------

    /// Re-issue the request for the current query
    pub async fn refresh(&self) -> Outcome {
        self.update_query(|query| Some(query.request())).await
    }

    pub async fn search(&self, keyword: &str) -> Outcome {
        self.update_query(|query| Some(query.search(keyword))).await
    }

    /// Search after the configured quiet period; a newer call replaces a
    /// pending one.
    ///
    /// The receiver yields the search outcome, or an error when this call
    /// was superseded or cancelled before it ran.
    pub fn search_debounced(
        self: &Arc<Self>,
        keyword: impl Into<String>,
    ) -> oneshot::Receiver<Outcome> {
        let (tx, rx) = oneshot::channel();
        let directory = Arc::clone(self);
        let keyword = keyword.into();
        self.debouncer.call(async move {
            let outcome = directory.search(&keyword).await;
            let _ = tx.send(outcome);
        });
        rx
    }

    pub async fn filter_category(&self, category: Option<Category>) -> Outcome {
        self.update_query(|query| Some(query.filter_category(category)))
            .await
    }

    pub async fn set_page_size(&self, size: u32) -> Outcome {
        self.update_query(|query| query.set_page_size(size)).await
    }

    pub async fn change_page(&self, page: u32) -> Outcome {
        self.update_query(|query| query.change_page(page)).await
    }

    pub async fn next_page(&self) -> Outcome {
        self.update_query(ListQuery::next_page).await
    }

    pub async fn previous_page(&self) -> Outcome {
        self.update_query(ListQuery::previous_page).await
    }

    pub async fn clear_filters(&self) -> Outcome {
        self.debouncer.cancel();
        self.update_query(|query| Some(query.clear_filters())).await
    }

    /// Apply `change` to the query and fetch the request it yields.
    ///
    /// The ticket is taken under the same lock as the change so tickets
    /// are ordered like the query states they belong to.
    async fn update_query<F>(&self, change: F) -> Outcome
    where
        F: FnOnce(&mut ListQuery) -> Option<ListRequest>,
    {
        let (request, ticket) = {
            let mut state = self.state.lock().await;
            match change(&mut state.query) {
                Some(request) => (request, self.next_ticket()),
                None => return Outcome::Ignored,
            }
        };
        self.fetch(request, ticket).await
    }

    fn next_ticket(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Send `request` and apply the response if `ticket` is still the
    /// newest. A page past the end is retried once per shrink as the last
    /// page that exists.
    async fn fetch(&self, mut request: ListRequest, mut ticket: u64) -> Outcome {
        let _loading = LoadingGuard::new(&self.loading);

        loop {
            let result = self.api.list(&request).await;

            let mut state = self.state.lock().await;
            if self.generation.load(Ordering::SeqCst) != ticket {
                debug!("Discarding stale response for {:?} (ticket {})", request, ticket);
                return Outcome::Stale;
            }

            match result {
                Ok(page) => {
                    let state = &mut *state;
                    state.query.apply(&page);
                    if let Some(retry) = state.query.clamp_page() {
                        debug!(
                            "Page {} is past the end, loading page {}",
                            request.page(),
                            retry.page()
                        );
                        request = retry;
                        ticket = self.next_ticket();
                        continue;
                    }
                    state.view = Some(ListView::build(&page, &state.query));
                    return Outcome::Done;
                }
                Err(e) => {
                    warn!("Error loading contacts: {}", e);
                    state
                        .notifier
                        .show(e.user_message(LOAD_FAILED), Severity::Error);
                    return Outcome::Failed;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Create / edit form
    // ------------------------------------------------------------------

    pub async fn open_create(&self) {
        self.state.lock().await.form.open_create();
    }

    /// Fetch the contact and open the form in edit mode
    pub async fn open_edit(&self, id: ContactId) -> Outcome {
        match self.api.get(id).await {
            Ok(contact) => {
                self.state.lock().await.form.open_edit(&contact);
                Outcome::Done
            }
            Err(e) => {
                warn!("Error fetching contact {}: {}", id, e);
                self.notify(e.user_message(FETCH_FAILED), Severity::Error)
                    .await;
                Outcome::Failed
            }
        }
    }

    pub async fn close_form(&self) {
        self.state.lock().await.form.close();
    }

    /// Edit the open form's fields; returns `false` when no form is open
    pub async fn edit_form<F>(&self, edit: F) -> bool
    where
        F: FnOnce(&mut FormFields),
    {
        let mut state = self.state.lock().await;
        if !state.form.is_open() {
            return false;
        }
        edit(state.form.fields_mut());
        true
    }

    /// Submit the open form: POST in create mode, PUT in edit mode.
    ///
    /// On success the form closes and the list reloads with the current
    /// filters. On failure the form stays open with its values.
    pub async fn save(&self) -> Outcome {
        let Some(busy) = BusyGuard::try_acquire(&self.saving) else {
            debug!("Save already in flight");
            return Outcome::Ignored;
        };

        let (mode, input) = {
            let mut state = self.state.lock().await;
            if !state.form.is_open() {
                return Outcome::Ignored;
            }
            match state.form.to_input() {
                Ok(input) => (state.form.mode(), input),
                Err(e) => {
                    state.notifier.show(e.to_string(), Severity::Error);
                    return Outcome::Failed;
                }
            }
        };

        let result = match mode {
            FormMode::Create => self.api.create(&input).await,
            FormMode::Edit(id) => self.api.update(id, &input).await,
        };

        match result {
            Ok(contact) => {
                {
                    let mut state = self.state.lock().await;
                    state.form.close();
                    let message = match mode {
                        FormMode::Create => "Contact added",
                        FormMode::Edit(_) => "Contact updated",
                    };
                    state.notifier.show(message, Severity::Success);
                }
                info!("Saved contact {}", contact.id);
                drop(busy);
                self.refresh().await;
                Outcome::Done
            }
            Err(e) => {
                warn!("Error saving contact: {}", e);
                self.notify(e.user_message(SAVE_FAILED), Severity::Error)
                    .await;
                Outcome::Failed
            }
        }
    }

    /// Warn when the form's phone number or email already belongs to
    /// another contact. The server has the final say; this only informs.
    pub async fn check_duplicates(&self) -> Option<String> {
        let (phone_number, email, exclude) = {
            let state = self.state.lock().await;
            if !state.form.is_open() {
                return None;
            }
            let fields = state.form.fields();
            let exclude = match state.form.mode() {
                FormMode::Create => None,
                FormMode::Edit(id) => Some(id),
            };
            (
                fields.phone_number.trim().to_string(),
                fields.email.trim().to_string(),
                exclude,
            )
        };

        let mut warning = None;
        if !phone_number.is_empty() {
            match self.api.phone_exists(&phone_number, exclude).await {
                Ok(true) => warning = Some(format!("Phone number {} is already in use", phone_number)),
                Ok(false) => {}
                Err(e) => debug!("Phone number check failed: {}", e),
            }
        }
        if warning.is_none() && !email.is_empty() {
            match self.api.email_exists(&email, exclude).await {
                Ok(true) => warning = Some(format!("Email {} is already in use", email)),
                Ok(false) => {}
                Err(e) => debug!("Email check failed: {}", e),
            }
        }

        if let Some(message) = &warning {
            self.notify(message.clone(), Severity::Warning).await;
        }
        warning
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Open the confirmation prompt; nothing is sent yet
    pub async fn request_delete(&self, id: ContactId) {
        self.state.lock().await.delete.request(id);
    }

    pub async fn cancel_delete(&self) {
        self.state.lock().await.delete.cancel();
    }

    /// Delete the pending target. On failure the prompt stays open.
    pub async fn confirm_delete(&self) -> Outcome {
        let Some(busy) = BusyGuard::try_acquire(&self.deleting) else {
            debug!("Delete already in flight");
            return Outcome::Ignored;
        };

        let Some(id) = self.state.lock().await.delete.target() else {
            return Outcome::Ignored;
        };

        match self.api.delete(id).await {
            Ok(()) => {
                {
                    let mut state = self.state.lock().await;
                    state.delete.cancel();
                    state.notifier.show("Contact deleted", Severity::Success);
                }
                drop(busy);
                self.refresh().await;
                Outcome::Done
            }
            Err(e) => {
                warn!("Error deleting contact {}: {}", id, e);
                self.notify(e.user_message(DELETE_FAILED), Severity::Error)
                    .await;
                Outcome::Failed
            }
        }
    }

    /// Delete several contacts in one request. Callers confirm first.
    pub async fn delete_many(&self, ids: &[ContactId]) -> Outcome {
        if ids.is_empty() {
            return Outcome::Ignored;
        }
        let Some(busy) = BusyGuard::try_acquire(&self.deleting) else {
            return Outcome::Ignored;
        };

        match self.api.delete_many(ids).await {
            Ok(message) => {
                self.notify(message, Severity::Success).await;
                drop(busy);
                self.refresh().await;
                Outcome::Done
            }
            Err(e) => {
                warn!("Error batch deleting {:?}: {}", ids, e);
                self.notify(e.user_message(DELETE_FAILED), Severity::Error)
                    .await;
                Outcome::Failed
            }
        }
    }

    // ------------------------------------------------------------------
    // Statistics and lookups
    // ------------------------------------------------------------------

    pub async fn show_statistics(&self) -> Outcome {
        match self.api.statistics().await {
            Ok(stats) => {
                self.state.lock().await.statistics = Some(StatisticsView::build(&stats));
                Outcome::Done
            }
            Err(e) => {
                warn!("Error fetching statistics: {}", e);
                self.notify(e.user_message(STATISTICS_FAILED), Severity::Error)
                    .await;
                Outcome::Failed
            }
        }
    }

    pub async fn close_statistics(&self) {
        self.state.lock().await.statistics = None;
    }

    /// Exact phone number lookup
    pub async fn find_by_phone(&self, phone_number: &str) -> Option<ContactCard> {
        let phone_number = phone_number.trim();
        if phone_number.is_empty() {
            return None;
        }

        match self.api.find_by_phone(phone_number).await {
            Ok(Some(contact)) => Some(ContactCard::from(&contact)),
            Ok(None) => {
                self.notify(
                    format!("No contact with phone number {}", phone_number),
                    Severity::Info,
                )
                .await;
                None
            }
            Err(e) => {
                warn!("Error looking up {}: {}", phone_number, e);
                self.notify(e.user_message(LOOKUP_FAILED), Severity::Error)
                    .await;
                None
            }
        }
    }
}
