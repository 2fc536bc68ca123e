//! Client configuration shared by every front-end.
//!
//! Values come from the CLI profile file, environment overrides and flags;
//! this module only holds the resolved result and its validation.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::{normalize_base_url, DiaryApiClient};
use crate::util::normalize_text_option;
use crate::{Error, Result};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_SEARCH_DEBOUNCE_MS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            request_timeout_secs: default_request_timeout_secs(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl ClientConfig {
    /// Apply an explicit server URL on top of the stored one.
    #[must_use]
    pub fn with_server_override(mut self, server_url: Option<String>) -> Self {
        if let Some(url) = normalize_text_option(server_url) {
            self.server_url = url;
        }
        self
    }

    /// Check and normalise every field.
    pub fn validated(mut self) -> Result<Self> {
        self.server_url = normalize_base_url(&self.server_url)?;
        if self.request_timeout_secs == 0 {
            return Err(Error::InvalidConfiguration(
                "request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn api_client(&self) -> Result<DiaryApiClient> {
        DiaryApiClient::with_timeout(&self.server_url, self.request_timeout())
    }
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_search_debounce_ms() -> u64 {
    DEFAULT_SEARCH_DEBOUNCE_MS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config: ClientConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
    }

    #[test]
    fn server_override_wins_over_stored_value() {
        let config = ClientConfig::default()
            .with_server_override(Some(" https://diary.example.com/ ".to_string()))
            .validated()
            .unwrap();
        assert_eq!(config.server_url, "https://diary.example.com");
    }

    #[test]
    fn blank_override_keeps_stored_value() {
        let config = ClientConfig::default().with_server_override(Some("  ".to_string()));
        assert_eq!(config.server_url, DEFAULT_SERVER_URL);
    }

    #[test]
    fn validated_rejects_zero_timeout_and_bad_url() {
        let zero_timeout = ClientConfig {
            request_timeout_secs: 0,
            ..ClientConfig::default()
        };
        assert!(zero_timeout.validated().is_err());

        let bad_url = ClientConfig {
            server_url: "diary.example.com".to_string(),
            ..ClientConfig::default()
        };
        assert!(bad_url.validated().is_err());
    }
}
