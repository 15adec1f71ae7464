//! pb-app: Phonebook directory state and controller
//!
//! This crate holds everything between the REST client and the screen:
//! list query state, the create/edit form, the delete prompt,
//! notifications, view models and the [`Directory`] controller that wires
//! them to a [`pb_client::ContactsApi`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pb_app::{Directory, DirectorySettings};
//! use pb_client::ContactsClient;
//! use std::sync::Arc;
//!
//! let client = ContactsClient::new(&config.api)?;
//! let directory = Arc::new(Directory::new(Arc::new(client), DirectorySettings::from(&config)));
//!
//! directory.refresh().await;
//! let pending = directory.search_debounced("alice");
//! ```

pub mod debounce;
pub mod delete;
pub mod directory;
pub mod error;
pub mod form;
pub mod list;
pub mod notify;
pub mod view;

#[cfg(test)]
mod testing;

pub use debounce::Debouncer;
pub use delete::DeletePrompt;
pub use directory::{Directory, DirectorySettings, Outcome};
pub use error::ValidationError;
pub use form::{ContactForm, FormFields, FormMode};
pub use list::ListQuery;
pub use notify::{Notification, Notifier, Severity};
pub use view::{
    CategoryShare, ContactCard, ListBody, ListView, PageButton, PaginationView, StatisticsView,
    DATE_FORMAT, EMPTY_HINT, EMPTY_TITLE,
};
