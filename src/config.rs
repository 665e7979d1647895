// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Application configuration management.
//!
//! Persistent settings live in a TOML file managed by `confy`. The file holds
//! polling knobs plus a small string key-value table that backs the shared
//! [`ConfigStore`] used by the remote address initializer and the monitor.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use status_poller::{ConfigStore, PollerConfig};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

const APP_NAME: &str = "agent-status-desktop";
const CONFIG_NAME: &str = "config";

/// Application configuration stored in TOML format
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppConfig {
    /// Configuration schema version for migrations
    #[serde(default = "default_config_version")]
    pub config_version: u32,

    /// Milliseconds between scheduled status probes
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Automatic retries after a failed probe
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,

    /// Milliseconds to wait before retrying
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-request timeout for the agent service
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Free-form string settings (e.g. `remoteAddress`)
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

// Default value functions for serde
fn default_config_version() -> u32 {
    1
}

fn default_poll_interval_ms() -> u64 {
    5_000
}

fn default_retry_count() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    1_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            config_version: default_config_version(),
            poll_interval_ms: default_poll_interval_ms(),
            retry_count: default_retry_count(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            values: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Polling settings for the status monitor
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            name: "status".to_string(),
            interval: Duration::from_millis(self.poll_interval_ms),
            retries: self.retry_count,
            retry_delay: Duration::from_millis(self.retry_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Where the configuration file lives
#[derive(Debug, Clone)]
enum ConfigLocation {
    /// Platform config directory chosen by confy
    Default,
    /// Explicit file path (from `--config`)
    Path(PathBuf),
}

/// Durable [`ConfigStore`] backed by the confy TOML file.
///
/// Every `set` rewrites the file. A failed write is logged and the value is
/// kept in memory so the UI keeps working.
#[derive(Debug)]
pub struct ConfyStore {
    location: ConfigLocation,
    config: Mutex<AppConfig>,
}

impl ConfyStore {
    /// Load from the platform configuration directory
    pub fn load() -> Result<Self, confy::ConfyError> {
        let config: AppConfig = confy::load(APP_NAME, CONFIG_NAME)?;
        Ok(Self {
            location: ConfigLocation::Default,
            config: Mutex::new(config),
        })
    }

    /// Load from an explicit file path, creating it with defaults if missing
    pub fn load_path(path: impl Into<PathBuf>) -> Result<Self, confy::ConfyError> {
        let path = path.into();
        let config: AppConfig = confy::load_path(&path)?;
        Ok(Self {
            location: ConfigLocation::Path(path),
            config: Mutex::new(config),
        })
    }

    /// Get the config file path for display to user
    pub fn config_path(&self) -> Result<PathBuf, confy::ConfyError> {
        match &self.location {
            ConfigLocation::Default => confy::get_configuration_file_path(APP_NAME, CONFIG_NAME),
            ConfigLocation::Path(path) => Ok(path.clone()),
        }
    }

    /// Snapshot of the current configuration
    pub fn app_config(&self) -> AppConfig {
        self.config
            .lock()
            .map(|config| config.clone())
            .unwrap_or_default()
    }

    fn save(&self, config: &AppConfig) -> Result<(), confy::ConfyError> {
        match &self.location {
            ConfigLocation::Default => confy::store(APP_NAME, CONFIG_NAME, config),
            ConfigLocation::Path(path) => confy::store_path(path, config),
        }
    }
}

impl ConfigStore for ConfyStore {
    fn get(&self, key: &str) -> Option<String> {
        self.config
            .lock()
            .map(|config| config.values.get(key).cloned())
            .unwrap_or_default()
    }

    fn set(&self, key: &str, value: &str) {
        let Ok(mut config) = self.config.lock() else {
            warn!("Configuration lock poisoned, dropping write to '{}'", key);
            return;
        };

        config.values.insert(key.to_string(), value.to_string());

        match self.save(&config) {
            Ok(()) => debug!("Saved '{}' to configuration", key),
            Err(e) => warn!("Failed to save configuration: {}", e),
        }
    }
}
