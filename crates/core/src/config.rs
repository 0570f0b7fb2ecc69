// SPDX-License-Identifier: MIT

//! The `clankers.json` profile config file: read/write, env overlay, and
//! profile CRUD (§6.3/§6.5).

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_PROFILE: &str = "default";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config file: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no profile named {0:?}")]
    ProfileNotFound(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default = "default_sync_enabled")]
    pub sync_enabled: bool,
    #[serde(default = "default_sync_interval")]
    pub sync_interval: u32,
    #[serde(default = "default_auth")]
    pub auth: String,
}

fn default_sync_enabled() -> bool {
    false
}

fn default_sync_interval() -> u32 {
    30
}

fn default_auth() -> String {
    "none".to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            endpoint: None,
            sync_enabled: default_sync_enabled(),
            sync_interval: default_sync_interval(),
            auth: default_auth(),
        }
    }
}

/// `clankers.json` — `{ profiles: { <name>: Profile }, active_profile }`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
    #[serde(default = "default_active_profile")]
    pub active_profile: String,
}

fn default_active_profile() -> String {
    DEFAULT_PROFILE.to_string()
}

impl Default for Config {
    fn default() -> Self {
        let mut profiles = BTreeMap::new();
        profiles.insert(DEFAULT_PROFILE.to_string(), Profile::default());
        Self { profiles, active_profile: default_active_profile() }
    }
}

impl Config {
    /// Load from `path`, falling back to a fresh default config (with a
    /// single `default` profile) if the file does not exist yet.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = match std::fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Config::default(),
            Err(e) => return Err(e.into()),
        };
        config.apply_env_overlay();
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Overlay `CLANKERS_ENDPOINT`/`CLANKERS_SYNC_ENABLED` onto the active
    /// profile only. Never persisted back to disk.
    fn apply_env_overlay(&mut self) {
        let active = self.active_profile.clone();
        let profile = self.profiles.entry(active).or_default();
        if let Ok(endpoint) = std::env::var("CLANKERS_ENDPOINT") {
            profile.endpoint = Some(endpoint);
        }
        if let Ok(sync) = std::env::var("CLANKERS_SYNC_ENABLED") {
            profile.sync_enabled = matches!(sync.as_str(), "true" | "1");
        }
    }

    pub fn active_profile(&self) -> Option<&Profile> {
        self.profiles.get(&self.active_profile)
    }

    /// Set (or create) a profile's field by key. Unknown keys are an error
    /// surfaced to the CLI; this is the one place profile creation happens
    /// implicitly (`use` on an unknown name is rejected, `set` is not).
    pub fn set(&mut self, profile_name: &str, key: &str, value: &str) -> Result<(), ConfigError> {
        let profile = self.profiles.entry(profile_name.to_string()).or_default();
        match key {
            "endpoint" => profile.endpoint = Some(value.to_string()),
            "sync_enabled" => profile.sync_enabled = matches!(value, "true" | "1"),
            "sync_interval" => {
                profile.sync_interval = value.parse().unwrap_or(profile.sync_interval)
            }
            "auth" => profile.auth = value.to_string(),
            other => {
                return Err(ConfigError::ProfileNotFound(format!(
                    "unknown config key {other:?}"
                )))
            }
        }
        Ok(())
    }

    /// Switch the active profile. Does *not* create the profile — unlike
    /// `set`, a missing name here is a user-facing error (§6.3).
    pub fn use_profile(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.profiles.contains_key(name) {
            return Err(ConfigError::ProfileNotFound(name.to_string()));
        }
        self.active_profile = name.to_string();
        Ok(())
    }

    pub fn profile_names(&self) -> Vec<&str> {
        self.profiles.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
