pub mod http;
pub mod memory;
pub mod metadata;
pub mod traits;

use std::sync::Arc;

use crate::error::{Result, StudioError};
use crate::models::{ImageMetadata, StoredImage};

pub use http::HttpImageStore;
pub use memory::MemoryImageStore;
pub use metadata::{JsonFileMetadataStore, MemoryMetadataStore, MetadataStore};
pub use traits::{is_bare_filename, Collection, ImageStore};

/// Gateway over the library and archive galleries. Owns the image
/// backend and the metadata map that turns archived images back into
/// regeneratable requests.
pub struct StorageManager {
    store: Arc<dyn ImageStore>,
    metadata: Arc<dyn MetadataStore>,
}

impl StorageManager {
    pub fn new(store: Arc<dyn ImageStore>, metadata: Arc<dyn MetadataStore>) -> Self {
        Self { store, metadata }
    }

    /// Manager against the local file-serving backend, with the
    /// metadata map persisted to the given JSON file.
    pub fn with_backend(base_url: impl Into<String>, metadata_path: impl Into<std::path::PathBuf>) -> Self {
        Self::new(
            Arc::new(HttpImageStore::new(base_url)),
            Arc::new(JsonFileMetadataStore::new(metadata_path)),
        )
    }

    pub async fn list_library(&self) -> Result<Vec<StoredImage>> {
        self.store.list(Collection::Library).await
    }

    /// Archive listing, each entry enriched with its stored metadata.
    pub async fn list_archive(&self) -> Result<Vec<StoredImage>> {
        let mut images = self.store.list(Collection::Archive).await?;
        let map = self.metadata.load()?;
        for image in &mut images {
            image.metadata = map.get(&image.id).cloned();
        }
        Ok(images)
    }

    pub async fn list_overlays(&self) -> Result<Vec<StoredImage>> {
        self.store.list(Collection::Overlays).await
    }

    /// Non-failing listing for gallery loads: failures are logged and
    /// the collection shows up empty instead of blocking anything.
    pub async fn load_or_empty(&self, collection: Collection) -> Vec<StoredImage> {
        let listing = match collection {
            Collection::Archive => self.list_archive().await,
            other => self.store.list(other).await,
        };
        match listing {
            Ok(images) => images,
            Err(e) => {
                log::error!("Failed to load {}: {}", collection.dir(), e);
                Vec::new()
            }
        }
    }

    pub async fn save_to_library(&self, name: &str, base64: &str) -> Result<StoredImage> {
        self.store.save(Collection::Library, name, base64).await
    }

    /// Archives one generated variant together with the metadata needed
    /// to regenerate it later.
    pub async fn archive_with_metadata(
        &self,
        name: &str,
        base64: &str,
        metadata: Option<&ImageMetadata>,
    ) -> Result<StoredImage> {
        let mut image = self.store.save(Collection::Archive, name, base64).await?;
        if let Some(metadata) = metadata {
            self.set_metadata(&image.id, metadata)?;
            image.metadata = Some(metadata.clone());
        }
        Ok(image)
    }

    pub async fn remove_library_image(&self, id: &str) -> Result<()> {
        self.remove(id).await
    }

    /// Removes an archived image and detaches its metadata.
    pub async fn remove_archive_image(&self, id: &str) -> Result<()> {
        self.remove(id).await?;
        self.remove_metadata(id)
    }

    /// Best-effort bulk delete: every id is attempted independently,
    /// failures are logged per item. Returns the number of deletions
    /// that went through.
    pub async fn remove_many(&self, ids: &[String]) -> usize {
        let mut removed = 0;
        for id in ids {
            match self.remove(id).await {
                Ok(()) => {
                    let _ = self.remove_metadata(id);
                    removed += 1;
                }
                Err(e) => log::error!("Failed to delete image {}: {}", id, e),
            }
        }
        removed
    }

    async fn remove(&self, id: &str) -> Result<()> {
        if !is_bare_filename(id) {
            return Err(StudioError::StorageFailed(format!(
                "invalid file id: {}",
                id
            )));
        }
        self.store.remove(id).await
    }

    pub fn metadata_for(&self, id: &str) -> Result<Option<ImageMetadata>> {
        Ok(self.metadata.load()?.remove(id))
    }

    fn set_metadata(&self, id: &str, metadata: &ImageMetadata) -> Result<()> {
        let mut map = self.metadata.load()?;
        map.insert(id.to_string(), metadata.clone());
        self.metadata.store(&map)
    }

    fn remove_metadata(&self, id: &str) -> Result<()> {
        let mut map = self.metadata.load()?;
        if map.remove(id).is_some() {
            self.metadata.store(&map)?;
        }
        Ok(())
    }
}
