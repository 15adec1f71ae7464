//! Configuration management
//!
//! Settings are resolved in the following priority order:
//! 1. Environment variables
//! 2. `phonebook.toml` (or the file passed with `--config`)
//! 3. Default values
//!
//! Inside the TOML file `${VAR_NAME}` is replaced with the value of the
//! environment variable of the same name.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::{Error, Result};

/// Page sizes offered by the list view
pub const PAGE_SIZES: [u32; 3] = [10, 25, 50];

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "phonebook.toml";

/// REST API configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL of the contacts resource, e.g. `http://localhost:8080/api/contacts`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ApiConfig {
    /// Per-request timeout handed to the HTTP client
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// List and notification behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UiConfig {
    /// Initial page size, one of [`PAGE_SIZES`]
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Quiet period before a typed search is sent
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// How long a notification stays visible
    #[serde(default = "default_notification_secs")]
    pub notification_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            notification_secs: default_notification_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    /// Default `tracing` level directive, overridden by `RUST_LOG`
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Main configuration for phonebook
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub ui: UiConfig,

    #[serde(default)]
    pub log: LogConfig,
}

fn default_base_url() -> String {
    "http://localhost:8080/api/contacts".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_page_size() -> u32 {
    PAGE_SIZES[0]
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_notification_secs() -> u64 {
    3
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Expand `${VAR_NAME}` references with environment variable values.
    ///
    /// Unset variables expand to an empty string.
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::new();
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // consume '{'

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// Parse a TOML document, expanding environment references first
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let expanded = Self::expand_env_vars(content);
        let toml: TomlConfig = toml::from_str(&expanded)?;
        Ok(Self::from_toml_config(toml))
    }

    /// Load configuration from a TOML file.
    ///
    /// Environment variables override values from the file.
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;

        let mut cfg = Self::from_toml_str(&content)?;
        cfg.apply_env_overrides()?;
        cfg.validate()?;

        debug!("Loaded configuration from {}", path.display());
        Ok(cfg)
    }

    /// Load configuration from the default locations.
    ///
    /// Uses `./phonebook.toml` when present, otherwise defaults plus
    /// environment variables.
    pub fn load() -> Result<Self> {
        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load from an explicit path if given, otherwise from the default locations
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_toml_file(path),
            None => Self::load(),
        }
    }

    /// Defaults overridden by environment variables
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_toml_config(toml: TomlConfig) -> Self {
        let api = toml.api.unwrap_or_default();
        let ui = toml.ui.unwrap_or_default();
        let log = toml.log.unwrap_or_default();

        Config {
            api: ApiConfig {
                base_url: api.base_url.unwrap_or_else(default_base_url),
                timeout_secs: api.timeout_secs.unwrap_or_else(default_timeout_secs),
            },
            ui: UiConfig {
                page_size: ui.page_size.unwrap_or_else(default_page_size),
                search_debounce_ms: ui
                    .search_debounce_ms
                    .unwrap_or_else(default_search_debounce_ms),
                notification_secs: ui
                    .notification_secs
                    .unwrap_or_else(default_notification_secs),
            },
            log: LogConfig {
                level: log.level.unwrap_or_else(default_log_level),
            },
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Empty values are ignored so a blank variable never clobbers the file.
    fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get("PHONEBOOK_API_URL") {
            self.api.base_url = url;
        }
        if let Some(timeout) = get("PHONEBOOK_API_TIMEOUT") {
            self.api.timeout_secs = parse_value("PHONEBOOK_API_TIMEOUT", &timeout)?;
        }
        if let Some(size) = get("PHONEBOOK_PAGE_SIZE") {
            self.ui.page_size = parse_value("PHONEBOOK_PAGE_SIZE", &size)?;
        }
        if let Some(ms) = get("PHONEBOOK_SEARCH_DEBOUNCE_MS") {
            self.ui.search_debounce_ms = parse_value("PHONEBOOK_SEARCH_DEBOUNCE_MS", &ms)?;
        }
        if let Some(secs) = get("PHONEBOOK_NOTIFICATION_SECS") {
            self.ui.notification_secs = parse_value("PHONEBOOK_NOTIFICATION_SECS", &secs)?;
        }
        if let Some(level) = get("PHONEBOOK_LOG_LEVEL") {
            self.log.level = level;
        }

        Ok(())
    }

    /// Check values that the TOML types alone cannot constrain
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::Config("api.base_url must not be empty".to_string()));
        }
        if !PAGE_SIZES.contains(&self.ui.page_size) {
            return Err(Error::InvalidValue {
                key: "ui.page_size".to_string(),
                value: format!("{} (expected one of {:?})", self.ui.page_size, PAGE_SIZES),
            });
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::InvalidValue {
                key: "api.timeout_secs".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.ui.search_debounce_ms)
    }

    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.ui.notification_secs)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| Error::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

// ============================================================================
// TOML file layout
// ============================================================================

#[derive(Debug, Deserialize, Default)]
struct TomlConfig {
    api: Option<TomlApiConfig>,
    ui: Option<TomlUiConfig>,
    log: Option<TomlLogConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlApiConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlUiConfig {
    #[serde(default)]
    page_size: Option<u32>,
    #[serde(default)]
    search_debounce_ms: Option<u64>,
    #[serde(default)]
    notification_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlLogConfig {
    #[serde(default)]
    level: Option<String>,
}
