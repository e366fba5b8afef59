//! Studiogen: the generation core of a webhook-driven image studio.
//!
//! The library builds structured prompts from form input, posts them to
//! a configurable generation webhook, normalizes the heterogeneous
//! replies into image data, and persists results into file-backed
//! library and archive galleries together with the metadata needed to
//! regenerate any archived variant.

pub mod config;
pub mod error;
pub mod generation;
pub mod imaging;
pub mod logger;
pub mod models;
pub mod prompt;
pub mod storage;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

pub use config::{
    default_overlay_settings, JsonFileSettingsStore, MemorySettingsStore, OverlaySetting,
    SettingsStore, StorageConfig, StudioConfig, StudioSettings, Theme, WebhookConfig,
};
pub use error::{Result, StudioError};
pub use generation::{EngineSnapshot, GenerationEngine, STATUS_PHRASES};
pub use models::{
    GenerationPayload, GenerationRequest, ImageMetadata, ImageReference, Phase, StoredImage,
};
pub use prompt::{construct_prompt, format_headline};
pub use storage::{Collection, HttpImageStore, ImageStore, MemoryImageStore, StorageManager};
pub use webhook::{WebhookClient, WorkflowInvoker};

/// Everything a studio session needs, wired from one config: the
/// generation engine, the storage gateway, and the persisted client
/// settings.
pub struct StudioClient {
    engine: GenerationEngine,
    storage: Arc<StorageManager>,
    settings: StudioSettings,
    settings_store: Option<Arc<dyn SettingsStore>>,
}

impl StudioClient {
    pub fn new(config: StudioConfig) -> Result<Self> {
        let storage = Arc::new(StorageManager::with_backend(
            config.storage.base_url.clone(),
            config.storage.metadata_path.clone(),
        ));

        let webhook = WebhookClient::with_timeout(Duration::from_secs(config.webhook.timeout_secs));
        let engine = GenerationEngine::new(Arc::new(webhook), Arc::clone(&storage));

        let settings_store: Option<Arc<dyn SettingsStore>> = config
            .settings_path
            .as_ref()
            .map(|path| Arc::new(JsonFileSettingsStore::new(path.clone())) as Arc<dyn SettingsStore>);

        let mut settings = match settings_store.as_ref() {
            Some(store) => store.load()?.unwrap_or_default(),
            None => StudioSettings::default(),
        };

        // An explicitly configured endpoint takes the primary slot.
        if let Some(endpoint) = &config.webhook.endpoint_url {
            if let Some(primary) = settings.overlays.first_mut() {
                primary.url = endpoint.clone();
            }
        }

        Ok(Self {
            engine,
            storage,
            settings,
            settings_store,
        })
    }

    pub fn engine(&self) -> &GenerationEngine {
        &self.engine
    }

    pub fn storage(&self) -> &Arc<StorageManager> {
        &self.storage
    }

    pub fn settings(&self) -> &StudioSettings {
        &self.settings
    }

    /// Replaces the settings and persists them when a store is wired.
    pub fn update_settings(&mut self, settings: StudioSettings) -> Result<()> {
        if let Some(store) = self.settings_store.as_ref() {
            store.save(&settings)?;
        }
        self.settings = settings;
        Ok(())
    }

    /// Generates against the primary preset endpoint.
    pub async fn generate(&self, mut request: GenerationRequest) -> Result<()> {
        if request.endpoint_url.is_empty() {
            request.endpoint_url = self
                .settings
                .primary_endpoint()
                .ok_or_else(|| StudioError::ConfigError("no webhook endpoint configured".into()))?
                .to_string();
        }
        self.engine.generate(request).await
    }

    /// Regenerates an archived variant against the primary preset
    /// endpoint.
    pub async fn regenerate(&self, metadata: &ImageMetadata) -> Result<()> {
        let endpoint = self
            .settings
            .primary_endpoint()
            .ok_or_else(|| StudioError::ConfigError("no webhook endpoint configured".into()))?
            .to_string();
        self.engine.regenerate(metadata, &endpoint).await
    }
}
