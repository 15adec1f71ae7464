//! Error types for pb-client

use thiserror::Error;

/// Text shown to the user when the server could not be reached
pub const NETWORK_ERROR_MESSAGE: &str = "Network error, please try again later";

/// pb-client error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The request never produced an HTTP response
    #[error("Connection error: {0}")]
    Transport(String),

    /// Non-2xx response, with the server's message when it sent one
    #[error("API error {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Api { status: u16, message: Option<String> },

    #[error("Contact not found: {0}")]
    NotFound(String),

    #[error("Invalid response: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Text for a notification describing this failure.
    ///
    /// Transport failures get the generic network message, API failures
    /// surface the server's message verbatim, everything else falls back to
    /// the action-specific `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if self.is_transport() {
            return NETWORK_ERROR_MESSAGE.to_string();
        }
        match self {
            Self::Api {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_transport() {
        let err = ClientError::Transport("connection refused".to_string());
        assert!(err.is_transport());
        assert_eq!(err.user_message("Save failed"), NETWORK_ERROR_MESSAGE);
    }

    #[test]
    fn test_user_message_server_text() {
        let err = ClientError::Api {
            status: 400,
            message: Some("Phone number already exists".to_string()),
        };
        assert_eq!(err.user_message("Save failed"), "Phone number already exists");
    }

    #[test]
    fn test_user_message_fallbacks() {
        let blank = ClientError::Api {
            status: 500,
            message: Some("  ".to_string()),
        };
        assert_eq!(blank.user_message("Save failed"), "Save failed");

        let missing = ClientError::Api {
            status: 500,
            message: None,
        };
        assert_eq!(missing.user_message("Delete failed"), "Delete failed");
        assert_eq!(missing.to_string(), "API error 500: no message");

        let decode = ClientError::Decode("expected value".to_string());
        assert_eq!(decode.user_message("Load failed"), "Load failed");
    }
}
