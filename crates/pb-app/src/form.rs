//! Create/edit contact form

use pb_client::{Category, Contact, ContactId, ContactInput};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::ValidationError;

const NAME_MAX: usize = 100;
const PHONE_MAX: usize = 20;
const EMAIL_MAX: usize = 100;
const ADDRESS_MAX: usize = 255;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+$").expect("email pattern is valid"));

/// Whether the form creates a new contact or edits an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(ContactId),
}

/// Raw field values as the user typed them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pub name: String,
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub category: Option<Category>,
    /// Category key from the server that has no [`Category`] variant.
    /// Sent back unchanged unless `category` is set.
    pub kept_category: Option<String>,
    pub notes: String,
}

impl FormFields {
    /// Fresh fields for a new contact
    pub fn blank() -> Self {
        Self {
            category: Some(Category::Personal),
            ..Self::default()
        }
    }

    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            phone_number: contact.phone_number.clone(),
            email: contact.email.clone().unwrap_or_default(),
            address: contact.address.clone().unwrap_or_default(),
            category: contact.unknown_category.is_none().then_some(contact.category),
            kept_category: contact.unknown_category.clone(),
            notes: contact.notes.clone().unwrap_or_default(),
        }
    }

    /// Key that will be sent for the category, if any
    pub fn category_key(&self) -> Option<&str> {
        self.category
            .map(|c| c.as_str())
            .or(self.kept_category.as_deref())
    }

    pub fn category_label(&self) -> Option<&str> {
        self.category
            .map(|c| c.label())
            .or(self.kept_category.as_deref())
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError::TooLong { field, max });
    }
    Ok(())
}

/// Modal form state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactForm {
    mode: FormMode,
    fields: FormFields,
    open: bool,
}

impl Default for ContactForm {
    fn default() -> Self {
        Self::closed()
    }
}

impl ContactForm {
    pub fn closed() -> Self {
        Self {
            mode: FormMode::Create,
            fields: FormFields::blank(),
            open: false,
        }
    }

    pub fn open_create(&mut self) {
        self.mode = FormMode::Create;
        self.fields = FormFields::blank();
        self.open = true;
    }

    pub fn open_edit(&mut self, contact: &Contact) {
        self.mode = FormMode::Edit(contact.id);
        self.fields = FormFields::from_contact(contact);
        self.open = true;
    }

    /// Close and discard whatever was entered
    pub fn close(&mut self) {
        *self = Self::closed();
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FormFields {
        &mut self.fields
    }

    pub fn title(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Add contact",
            FormMode::Edit(_) => "Edit contact",
        }
    }

    /// Validate and serialize the fields.
    ///
    /// Everything is trimmed; blank optional fields become `None` so they
    /// are left out of the request body.
    pub fn to_input(&self) -> Result<ContactInput, ValidationError> {
        let f = &self.fields;

        let name = f.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required { field: "Name" });
        }
        check_len("Name", name, NAME_MAX)?;

        let phone_number = f.phone_number.trim();
        if phone_number.is_empty() {
            return Err(ValidationError::Required {
                field: "Phone number",
            });
        }
        check_len("Phone number", phone_number, PHONE_MAX)?;

        let email = optional(&f.email);
        if let Some(email) = &email {
            check_len("Email", email, EMAIL_MAX)?;
            if !EMAIL_RE.is_match(email) {
                return Err(ValidationError::InvalidEmail);
            }
        }

        let address = optional(&f.address);
        if let Some(address) = &address {
            check_len("Address", address, ADDRESS_MAX)?;
        }

        Ok(ContactInput {
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            email,
            address,
            category: f.category_key().map(str::to_string),
            notes: optional(&f.notes),
        })
    }
}
