//! pb-core: Phonebook Core Library
//!
//! Configuration loading and the shared error type used by the
//! phonebook client crates.

pub mod config;
pub mod error;

pub use config::{ApiConfig, Config, LogConfig, UiConfig, PAGE_SIZES};
pub use error::{Error, Result};
