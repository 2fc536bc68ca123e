//! Persistent CLI profile configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use diary_core::config::ClientConfig;
use diary_core::session::FileStorage;
use diary_core::util::normalize_text_option;
use serde::{Deserialize, Serialize};

use crate::keychain::{CliStorage, KeyringStorage};

const APP_DIR_NAME: &str = "diary";
const CONFIG_FILE_NAME: &str = "cli-config.json";
const SESSION_FILE_NAME: &str = "session.json";
pub const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfilesConfig {
    #[serde(default = "default_config_version")]
    pub version: u32,
    #[serde(default)]
    pub active_profile: Option<String>,
    #[serde(default)]
    pub profiles: BTreeMap<String, CliProfile>,
}

/// Unset fields fall back to [`ClientConfig`] defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CliProfile {
    #[serde(default)]
    pub server_url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub search_debounce_ms: Option<u64>,
    #[serde(default)]
    pub session_store: Option<SessionBackend>,
}

/// Where a profile keeps its session token between runs.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// The OS keychain
    #[default]
    Keyring,
    /// A JSON file readable by the owner only
    File,
}

impl SessionBackend {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keyring => "keyring",
            Self::File => "file",
        }
    }
}

const fn default_config_version() -> u32 {
    1
}

pub fn default_config_path() -> Result<PathBuf, String> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
        .ok_or_else(|| "Failed to resolve CLI config directory".to_string())
}

/// Where the session token for `profile` is kept between runs.
pub fn session_storage_path(profile: &str) -> Result<PathBuf, String> {
    dirs::data_dir()
        .map(|dir| {
            dir.join(APP_DIR_NAME)
                .join(profile)
                .join(SESSION_FILE_NAME)
        })
        .ok_or_else(|| "Failed to resolve data directory".to_string())
}

/// Session storage for `profile` on the chosen backend.
pub fn session_storage(profile: &str, backend: SessionBackend) -> Result<CliStorage, String> {
    match backend {
        SessionBackend::Keyring => Ok(CliStorage::Keyring(KeyringStorage::new(profile))),
        SessionBackend::File => Ok(CliStorage::File(FileStorage::new(session_storage_path(
            profile,
        )?))),
    }
}

pub fn normalize_profile_name(value: Option<&str>) -> Option<String> {
    let value = value?.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

impl CliProfilesConfig {
    pub fn load() -> Result<Self, String> {
        Self::load_from_path(&default_config_path()?)
    }

    pub fn load_from_path(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|error| format!("Failed to read config at {}: {}", path.display(), error))?;
        let mut config = serde_json::from_str::<Self>(&raw)
            .map_err(|error| format!("Failed to parse config at {}: {}", path.display(), error))?;
        config.normalize();
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, String> {
        let path = default_config_path()?;
        self.save_to_path(&path)?;
        Ok(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|error| {
                format!(
                    "Failed to create config directory {}: {}",
                    parent.display(),
                    error
                )
            })?;
        }

        let mut normalized = self.clone();
        normalized.normalize();
        let serialized = serde_json::to_string_pretty(&normalized)
            .map_err(|error| format!("Failed to serialize config: {error}"))?;
        std::fs::write(path, serialized)
            .map_err(|error| format!("Failed to write config at {}: {}", path.display(), error))
    }

    pub fn resolve_profile_name(&self, explicit: Option<&str>) -> String {
        self.resolve_profile_name_with_env(
            explicit,
            std::env::var("DIARY_PROFILE").ok().as_deref(),
        )
    }

    fn resolve_profile_name_with_env(&self, explicit: Option<&str>, env: Option<&str>) -> String {
        normalize_profile_name(explicit)
            .or_else(|| normalize_profile_name(env))
            .or_else(|| normalize_profile_name(self.active_profile.as_deref()))
            .unwrap_or_else(|| DEFAULT_PROFILE.to_string())
    }

    pub fn profile(&self, name: &str) -> Option<&CliProfile> {
        self.profiles.get(name)
    }

    pub fn profile_mut_or_default(&mut self, name: &str) -> &mut CliProfile {
        self.profiles.entry(name.to_string()).or_default()
    }

    fn normalize(&mut self) {
        self.active_profile = normalize_profile_name(self.active_profile.as_deref());
        for profile in self.profiles.values_mut() {
            profile.server_url = normalize_text_option(profile.server_url.take());
        }
    }
}

impl CliProfile {
    /// Merge with defaults; `server_override` wins over the stored URL.
    pub fn client_config(&self, server_override: Option<String>) -> ClientConfig {
        let defaults = ClientConfig::default();
        ClientConfig {
            server_url: self.server_url.clone().unwrap_or(defaults.server_url),
            request_timeout_secs: self
                .request_timeout_secs
                .unwrap_or(defaults.request_timeout_secs),
            search_debounce_ms: self
                .search_debounce_ms
                .unwrap_or(defaults.search_debounce_ms),
        }
        .with_server_override(server_override)
    }
}
