use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::discovery::DiscoveryOptions;
use crate::http::HttpConfig;
use crate::widgets::DEFAULT_REFRESH_INTERVAL_MS;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub request_timeout_ms: u64,
    pub user_agent: String,
    pub discovery: DiscoveryOptions,
    pub default_refresh_interval_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let http = HttpConfig::default();
        Self {
            request_timeout_ms: http.timeout_ms,
            user_agent: http.user_agent,
            discovery: DiscoveryOptions::default(),
            default_refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

impl Settings {
    pub fn http_config(&self) -> HttpConfig {
        HttpConfig {
            timeout_ms: self.request_timeout_ms,
            user_agent: self.user_agent.clone(),
        }
    }
}

/// JSON-file backed settings. A missing or unreadable file falls back to defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed settings at {}: {}", path.display(), err);
                Settings::default()
            })
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> Result<Settings> {
        self.data
            .read()
            .map(|guard| guard.clone())
            .map_err(|_| anyhow!("settings lock poisoned"))
    }

    pub fn update(&self, settings: Settings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
