//! REST client implementation

use async_trait::async_trait;
use pb_core::ApiConfig;
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use crate::api::{ContactsApi, ListRequest};
use crate::error::{ClientError, Result};
use crate::models::{Contact, ContactId, ContactInput, ContactPage, Statistics};

/// HTTP client for the `/api/contacts` resource
#[derive(Clone)]
pub struct ContactsClient {
    client: Client,
    base_url: Url,
}

/// Error payload. The server puts the text under `error`, older builds
/// under `message`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ErrorBody {
    fn message_from(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        parsed
            .message
            .or(parsed.error)
            .filter(|m| !m.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct ExistsResponse {
    exists: bool,
}

#[derive(Debug, Default, Deserialize)]
struct MessageResponse {
    #[serde(default)]
    message: Option<String>,
}

impl ContactsClient {
    /// Create a new client for the configured base URL
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Configuration(e.to_string()))?;

        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| ClientError::Configuration(format!("{}: {}", config.base_url, e)))?;

        if base_url.cannot_be_a_base() {
            return Err(ClientError::Configuration(format!(
                "{} cannot be used as a base URL",
                config.base_url
            )));
        }

        info!("Contacts client initialized for: {}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Base URL with `segments` appended, each one percent-encoded
    fn endpoint<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ClientError::Configuration(format!("{} cannot be used as a base URL", self.base_url))
            })?;
            path.pop_if_empty();
            path.extend(segments.iter().map(|s| s.as_ref()));
        }
        Ok(url)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))
    }

    /// Turn a non-2xx response into [`ClientError::Api`]
    async fn ensure_success(response: Response, action: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        error!("{} failed: {} - {}", action, status, body);

        Err(ClientError::Api {
            status: status.as_u16(),
            message: ErrorBody::message_from(&body),
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ContactsApi for ContactsClient {
    async fn list(&self, request: &ListRequest) -> Result<ContactPage> {
        let url = self.endpoint(request.segments().as_slice())?;

        debug!("Fetching contacts from: {} {:?}", url, request.query());

        let response = self.send(self.client.get(url).query(&request.query())).await?;
        let response = Self::ensure_success(response, "List contacts").await?;
        let page: ContactPage = Self::decode(response).await?;

        debug!(
            "Fetched page {} of {} ({} contacts)",
            page.current_page,
            page.total_pages,
            page.contacts.len()
        );
        Ok(page)
    }

    async fn get(&self, id: ContactId) -> Result<Contact> {
        let url = self.endpoint(&[id.to_string()])?;

        debug!("Fetching contact: {}", url);

        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(id.to_string()));
        }
        let response = Self::ensure_success(response, "Get contact").await?;
        Self::decode(response).await
    }

    async fn create(&self, input: &ContactInput) -> Result<Contact> {
        let url = self.endpoint::<&str>(&[])?;

        debug!("Adding contact: {}", input.name);

        let response = self.send(self.client.post(url).json(input)).await?;
        let response = Self::ensure_success(response, "Add contact").await?;
        let contact: Contact = Self::decode(response).await?;

        info!("Added contact: {}", contact.id);
        Ok(contact)
    }

    async fn update(&self, id: ContactId, input: &ContactInput) -> Result<Contact> {
        let url = self.endpoint(&[id.to_string()])?;

        debug!("Updating contact: {}", id);

        let response = self.send(self.client.put(url).json(input)).await?;
        let response = Self::ensure_success(response, "Update contact").await?;
        let contact: Contact = Self::decode(response).await?;

        info!("Updated contact: {}", id);
        Ok(contact)
    }

    async fn delete(&self, id: ContactId) -> Result<()> {
        let url = self.endpoint(&[id.to_string()])?;

        debug!("Deleting contact: {}", id);

        let response = self.send(self.client.delete(url)).await?;
        Self::ensure_success(response, "Delete contact").await?;

        info!("Deleted contact: {}", id);
        Ok(())
    }

    async fn statistics(&self) -> Result<Statistics> {
        let url = self.endpoint(&["statistics"])?;

        let response = self.send(self.client.get(url)).await?;
        let response = Self::ensure_success(response, "Statistics").await?;
        Self::decode(response).await
    }

    async fn find_by_phone(&self, phone_number: &str) -> Result<Option<Contact>> {
        let url = self.endpoint(&["phone", phone_number])?;

        debug!("Looking up phone number: {}", url);

        let response = self.send(self.client.get(url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = Self::ensure_success(response, "Phone lookup").await?;
        Self::decode(response).await.map(Some)
    }

    async fn email_exists(&self, email: &str, exclude: Option<ContactId>) -> Result<bool> {
        let url = self.endpoint(&["check-email"])?;

        let mut params = vec![("email", email.to_string())];
        if let Some(id) = exclude {
            params.push(("excludeId", id.to_string()));
        }

        let response = self.send(self.client.get(url).query(&params)).await?;
        let response = Self::ensure_success(response, "Email check").await?;
        let result: ExistsResponse = Self::decode(response).await?;
        Ok(result.exists)
    }

    async fn phone_exists(&self, phone_number: &str, exclude: Option<ContactId>) -> Result<bool> {
        let url = self.endpoint(&["check-phone"])?;

        let mut params = vec![("phoneNumber", phone_number.to_string())];
        if let Some(id) = exclude {
            params.push(("excludeId", id.to_string()));
        }

        let response = self.send(self.client.get(url).query(&params)).await?;
        let response = Self::ensure_success(response, "Phone check").await?;
        let result: ExistsResponse = Self::decode(response).await?;
        Ok(result.exists)
    }

    async fn delete_many(&self, ids: &[ContactId]) -> Result<String> {
        let url = self.endpoint(&["batch"])?;

        debug!("Batch deleting {} contacts", ids.len());

        let response = self.send(self.client.delete(url).json(ids)).await?;
        let response = Self::ensure_success(response, "Batch delete").await?;
        let result: MessageResponse = Self::decode(response).await.unwrap_or_default();

        info!("Batch deleted contacts: {:?}", ids);
        Ok(result
            .message
            .unwrap_or_else(|| format!("Deleted {} contacts", ids.len())))
    }
}
