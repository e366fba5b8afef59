use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{Result, StudioError};
use crate::models::ImageMetadata;

/// Persistence port for the archive's regeneration metadata: one flat
/// map keyed by image id, loaded and replaced wholesale. No partial
/// updates, no versioning.
pub trait MetadataStore: Send + Sync {
    fn load(&self) -> Result<HashMap<String, ImageMetadata>>;
    fn store(&self, map: &HashMap<String, ImageMetadata>) -> Result<()>;
}

/// Metadata map persisted as one JSON file next to the galleries.
pub struct JsonFileMetadataStore {
    path: PathBuf,
}

impl JsonFileMetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl MetadataStore for JsonFileMetadataStore {
    fn load(&self) -> Result<HashMap<String, ImageMetadata>> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let raw = std::fs::read_to_string(&self.path).map_err(|e| {
            StudioError::StorageFailed(format!("failed to read metadata store: {}", e))
        })?;
        match serde_json::from_str(&raw) {
            Ok(map) => Ok(map),
            Err(e) => {
                // A corrupt store loses its metadata, not the gallery.
                log::warn!("Discarding unreadable metadata store: {}", e);
                Ok(HashMap::new())
            }
        }
    }

    fn store(&self, map: &HashMap<String, ImageMetadata>) -> Result<()> {
        let raw = serde_json::to_string(map)
            .map_err(|e| StudioError::SerializationError(e.to_string()))?;
        std::fs::write(&self.path, raw).map_err(|e| {
            StudioError::StorageFailed(format!("failed to write metadata store: {}", e))
        })
    }
}

/// In-process metadata map for tests and offline setups.
#[derive(Default)]
pub struct MemoryMetadataStore {
    map: Mutex<HashMap<String, ImageMetadata>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MetadataStore for MemoryMetadataStore {
    fn load(&self) -> Result<HashMap<String, ImageMetadata>> {
        Ok(self.map.lock().unwrap().clone())
    }

    fn store(&self, map: &HashMap<String, ImageMetadata>) -> Result<()> {
        *self.map.lock().unwrap() = map.clone();
        Ok(())
    }
}
