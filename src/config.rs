use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

/// Number of configurable webhook preset slots.
pub const OVERLAY_SLOTS: usize = 5;

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:3006";
const DEFAULT_WEBHOOK_TIMEOUT_SECS: u64 = 300;

/// A named webhook endpoint choice. The settings dialog edits a fixed
/// list of these; the first one is the primary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySetting {
    pub name: String,
    pub url: String,
}

/// Theme preference, persisted with the rest of the client settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// The client-side persisted state: webhook presets and theme.
/// Load-on-start, save-on-change, no migration or versioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioSettings {
    pub overlays: Vec<OverlaySetting>,
    #[serde(default)]
    pub theme: Theme,
}

impl Default for StudioSettings {
    fn default() -> Self {
        StudioSettings {
            overlays: default_overlay_settings(),
            theme: Theme::Dark,
        }
    }
}

impl StudioSettings {
    /// The endpoint a fresh session targets: the first preset.
    pub fn primary_endpoint(&self) -> Option<&str> {
        self.overlays.first().map(|setting| setting.url.as_str())
    }
}

pub fn default_overlay_settings() -> Vec<OverlaySetting> {
    (1..=OVERLAY_SLOTS)
        .map(|slot| OverlaySetting {
            name: if slot == 1 {
                "Primary".to_string()
            } else {
                format!("Preset {}", slot)
            },
            url: format!("https://workflows.example.com/webhook/PLACEHOLDER_{}", slot),
        })
        .collect()
}

/// Persistence port for [`StudioSettings`].
pub trait SettingsStore: Send + Sync {
    /// `None` when nothing has been saved yet; callers fall back to
    /// defaults.
    fn load(&self) -> Result<Option<StudioSettings>>;
    fn save(&self, settings: &StudioSettings) -> Result<()>;
}

/// Settings persisted as one JSON file.
pub struct JsonFileSettingsStore {
    path: PathBuf,
}

impl JsonFileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsStore for JsonFileSettingsStore {
    fn load(&self) -> Result<Option<StudioSettings>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| StudioError::ConfigError(format!("failed to read settings: {}", e)))?;
        match serde_json::from_str(&raw) {
            Ok(settings) => Ok(Some(settings)),
            Err(e) => {
                log::warn!("Discarding unreadable settings file: {}", e);
                Ok(None)
            }
        }
    }

    fn save(&self, settings: &StudioSettings) -> Result<()> {
        let raw = serde_json::to_string_pretty(settings)
            .map_err(|e| StudioError::SerializationError(e.to_string()))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| StudioError::ConfigError(format!("failed to write settings: {}", e)))
    }
}

/// In-process settings store for tests.
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: Mutex<Option<StudioSettings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<Option<StudioSettings>> {
        Ok(self.settings.lock().unwrap().clone())
    }

    fn save(&self, settings: &StudioSettings) -> Result<()> {
        *self.settings.lock().unwrap() = Some(settings.clone());
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub endpoint_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        WebhookConfig {
            endpoint_url: None,
            timeout_secs: DEFAULT_WEBHOOK_TIMEOUT_SECS,
        }
    }
}

impl WebhookConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let endpoint_url = env::var("STUDIO_WEBHOOK_URL").ok();
        let timeout_secs = env::var("STUDIO_WEBHOOK_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_WEBHOOK_TIMEOUT_SECS);

        WebhookConfig {
            endpoint_url,
            timeout_secs,
        }
    }

    pub fn with_endpoint(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = Some(url.into());
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub base_url: String,
    pub metadata_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            metadata_path: PathBuf::from("archive_metadata.json"),
        }
    }
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        StorageConfig {
            base_url: env::var("STUDIO_BACKEND_URL").unwrap_or(defaults.base_url),
            metadata_path: env::var("STUDIO_METADATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.metadata_path),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_metadata_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata_path = path.into();
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudioConfig {
    pub webhook: WebhookConfig,
    pub storage: StorageConfig,
    pub settings_path: Option<PathBuf>,
}

impl StudioConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        StudioConfig {
            webhook: WebhookConfig::from_env(),
            storage: StorageConfig::from_env(),
            settings_path: env::var("STUDIO_SETTINGS_PATH").ok().map(PathBuf::from),
        }
    }

    pub fn with_webhook(mut self, webhook: WebhookConfig) -> Self {
        self.webhook = webhook;
        self
    }

    pub fn with_storage(mut self, storage: StorageConfig) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_settings_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings_path = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_all_five_slots() {
        let settings = StudioSettings::default();
        assert_eq!(settings.overlays.len(), OVERLAY_SLOTS);
        assert_eq!(settings.overlays[0].name, "Primary");
        assert_eq!(
            settings.primary_endpoint(),
            Some("https://workflows.example.com/webhook/PLACEHOLDER_1")
        );
    }

    #[test]
    fn settings_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileSettingsStore::new(dir.path().join("settings.json"));

        assert!(store.load().unwrap().is_none());

        let mut settings = StudioSettings::default();
        settings.overlays[2].url = "https://workflows.example.com/webhook/custom".into();
        settings.theme = Theme::Light;
        store.save(&settings).unwrap();

        assert_eq!(store.load().unwrap(), Some(settings));
    }

    #[test]
    fn corrupt_settings_fall_back_to_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "]]").unwrap();
        assert!(JsonFileSettingsStore::new(path).load().unwrap().is_none());
    }

    #[test]
    fn builders_compose() {
        let config = StudioConfig::new()
            .with_webhook(
                WebhookConfig::new()
                    .with_endpoint("https://workflows.example.com/webhook/a")
                    .with_timeout_secs(60),
            )
            .with_storage(StorageConfig::new().with_base_url("http://localhost:4000"));

        assert_eq!(config.webhook.timeout_secs, 60);
        assert_eq!(config.storage.base_url, "http://localhost:4000");
    }
}
