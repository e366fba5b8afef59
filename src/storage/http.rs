use std::cmp::Ordering;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::error::{Result, StudioError};
use crate::models::{DeleteResponse, SaveImageResponse, StoredImage};
use crate::storage::traits::{Collection, ImageStore};

/// Image store backed by the local file-serving process's REST
/// endpoints.
pub struct HttpImageStore {
    client: Client,
    base_url: String,
}

impl HttpImageStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn list_url(&self, collection: Collection) -> String {
        let path = match collection {
            Collection::Library => "/api/images",
            Collection::Archive => "/api/archive",
            Collection::Overlays => "/api/overlays",
        };
        format!("{}{}", self.base_url, path)
    }

    fn save_url(&self, collection: Collection) -> String {
        let path = match collection {
            Collection::Library => "/api/save-image",
            Collection::Archive => "/api/save-to-archive",
            Collection::Overlays => "/api/save-overlay",
        };
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl ImageStore for HttpImageStore {
    async fn list(&self, collection: Collection) -> Result<Vec<StoredImage>> {
        let response = self
            .client
            .get(self.list_url(collection))
            .send()
            .await
            .map_err(|e| StudioError::StorageFailed(format!("failed to fetch {}: {}", collection.dir(), e)))?;

        if !response.status().is_success() {
            return Err(StudioError::StorageFailed(format!(
                "failed to fetch {}: status {}",
                collection.dir(),
                response.status()
            )));
        }

        let mut images: Vec<StoredImage> = response.json().await.map_err(|e| {
            StudioError::StorageFailed(format!("invalid {} listing: {}", collection.dir(), e))
        })?;

        images.sort_by(|a, b| {
            b.timestamp
                .partial_cmp(&a.timestamp)
                .unwrap_or(Ordering::Equal)
        });

        Ok(images)
    }

    async fn save(&self, collection: Collection, name: &str, base64: &str) -> Result<StoredImage> {
        log::debug!("Saving {} to {}", name, collection.dir());

        let response = self
            .client
            .post(self.save_url(collection))
            .json(&json!({ "name": name, "base64": base64 }))
            .send()
            .await
            .map_err(|e| StudioError::StorageFailed(format!("failed to save image: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(StudioError::StorageFailed(format!(
                "failed to save image: {} {}",
                status, body
            )));
        }

        let saved: SaveImageResponse = response.json().await.map_err(|e| {
            StudioError::StorageFailed(format!("invalid save response: {}", e))
        })?;

        if !saved.success {
            return Err(StudioError::StorageFailed(
                "backend refused to save the image".into(),
            ));
        }

        Ok(saved.image)
    }

    async fn remove(&self, id: &str) -> Result<()> {
        let response = self
            .client
            .delete(format!("{}/api/delete-image", self.base_url))
            .query(&[("id", id)])
            .send()
            .await
            .map_err(|e| StudioError::StorageFailed(format!("failed to delete image: {}", e)))?;

        if !response.status().is_success() {
            return Err(StudioError::StorageFailed(format!(
                "failed to delete image: status {}",
                response.status()
            )));
        }

        let deleted: DeleteResponse = response.json().await.map_err(|e| {
            StudioError::StorageFailed(format!("invalid delete response: {}", e))
        })?;

        if !deleted.success {
            return Err(StudioError::StorageFailed(format!(
                "backend refused to delete {}",
                id
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_urls_follow_the_backend_contract() {
        let store = HttpImageStore::new("http://127.0.0.1:3006/");
        assert_eq!(
            store.list_url(Collection::Library),
            "http://127.0.0.1:3006/api/images"
        );
        assert_eq!(
            store.list_url(Collection::Archive),
            "http://127.0.0.1:3006/api/archive"
        );
        assert_eq!(
            store.save_url(Collection::Archive),
            "http://127.0.0.1:3006/api/save-to-archive"
        );
        assert_eq!(
            store.save_url(Collection::Overlays),
            "http://127.0.0.1:3006/api/save-overlay"
        );
    }
}
