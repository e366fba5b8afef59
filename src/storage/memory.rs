use std::cmp::Ordering;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Result, StudioError};
use crate::models::StoredImage;
use crate::storage::traits::{is_bare_filename, Collection, ImageStore};

struct Entry {
    collection: Collection,
    image: StoredImage,
}

/// In-process image store with the same observable behavior as the
/// file-serving backend: server-assigned ids, disambiguated names,
/// collection-agnostic delete. Used in tests and offline setups.
#[derive(Default)]
pub struct MemoryImageStore {
    entries: Mutex<Vec<Entry>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn list(&self, collection: Collection) -> Result<Vec<StoredImage>> {
        let entries = self.entries.lock().unwrap();
        let mut images: Vec<StoredImage> = entries
            .iter()
            .filter(|entry| entry.collection == collection)
            .map(|entry| entry.image.clone())
            .collect();
        images.sort_by(|a, b| {
            b.timestamp
                .partial_cmp(&a.timestamp)
                .unwrap_or(Ordering::Equal)
        });
        Ok(images)
    }

    async fn save(&self, collection: Collection, name: &str, _base64: &str) -> Result<StoredImage> {
        let mut entries = self.entries.lock().unwrap();
        let timestamp = Utc::now().timestamp_millis() as f64;

        // Disambiguate the way the backend does, by prefixing a timestamp.
        let id = if entries.iter().any(|entry| entry.image.id == name) {
            format!("{}_{}", timestamp as i64, name)
        } else {
            name.to_string()
        };

        let image = StoredImage {
            id: id.clone(),
            name: id.clone(),
            url: format!("/{}/{}", collection.dir(), id),
            timestamp,
            metadata: None,
        };

        entries.push(Entry {
            collection,
            image: image.clone(),
        });

        Ok(image)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        if !is_bare_filename(id) {
            return Err(StudioError::StorageFailed(format!(
                "invalid file id: {}",
                id
            )));
        }
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|entry| entry.image.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryImageStore::new();
        store
            .save(Collection::Library, "a.png", "data:image/png;base64,eA==")
            .await
            .unwrap();
        store
            .save(Collection::Archive, "b.png", "data:image/png;base64,eA==")
            .await
            .unwrap();

        assert_eq!(store.list(Collection::Library).await.unwrap().len(), 1);
        assert_eq!(store.list(Collection::Archive).await.unwrap().len(), 1);
        assert!(store.list(Collection::Overlays).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_names_get_disambiguated_ids() {
        let store = MemoryImageStore::new();
        let first = store
            .save(Collection::Library, "a.png", "data:image/png;base64,eA==")
            .await
            .unwrap();
        let second = store
            .save(Collection::Library, "a.png", "data:image/png;base64,eA==")
            .await
            .unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn remove_rejects_traversal_ids() {
        let store = MemoryImageStore::new();
        store
            .save(Collection::Library, "a.png", "data:image/png;base64,eA==")
            .await
            .unwrap();

        assert!(store.remove("../a.png").await.is_err());
        assert_eq!(store.list(Collection::Library).await.unwrap().len(), 1);

        store.remove("a.png").await.unwrap();
        assert!(store.list(Collection::Library).await.unwrap().is_empty());
    }
}
