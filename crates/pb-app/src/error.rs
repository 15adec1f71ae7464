//! Error types for pb-app

use thiserror::Error;

/// Form input rejected before anything is sent to the server
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("Email address is not valid")]
    InvalidEmail,
}
