//! pb-client: REST client for the phonebook contacts API
//!
//! This crate provides the wire models, the [`ContactsApi`] trait the
//! directory controller is written against, and its `reqwest`
//! implementation.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pb_client::{ContactsApi, ContactsClient, ContactInput, ListRequest};
//!
//! let client = ContactsClient::new(&config.api)?;
//!
//! // First page of everyone
//! let page = client.list(&ListRequest::All { page: 0, size: 10 }).await?;
//!
//! // Add contact
//! client.create(&ContactInput::new("Alice", "555-1212")).await?;
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod models;

pub use api::{ContactsApi, ListRequest};
pub use client::ContactsClient;
pub use error::{ClientError, NETWORK_ERROR_MESSAGE, Result};
pub use models::{
    category_label, Category, Contact, ContactId, ContactInput, ContactPage, Statistics,
    UnknownCategory,
};
