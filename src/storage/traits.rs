use async_trait::async_trait;

use crate::error::Result;
use crate::models::StoredImage;

/// The two galleries plus the overlay collection the backend also
/// serves. The generation flow only ever touches Library and Archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Library,
    Archive,
    Overlays,
}

impl Collection {
    /// Directory name the backend serves this collection from.
    pub fn dir(&self) -> &'static str {
        match self {
            Collection::Library => "images",
            Collection::Archive => "archive",
            Collection::Overlays => "overlays",
        }
    }
}

/// An id is acceptable for deletion only as a bare filename; anything
/// that could traverse out of the collection directory is refused
/// before it reaches a backend.
pub fn is_bare_filename(id: &str) -> bool {
    !id.is_empty() && !id.contains('/') && !id.contains('\\') && id != "." && id != ".."
}

/// CRUD port over the file-backed image collections.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// All images of a collection, newest first.
    async fn list(&self, collection: Collection) -> Result<Vec<StoredImage>>;

    /// Persists an encoded image under the given name; the backend
    /// assigns the final id/name/url and timestamp.
    async fn save(&self, collection: Collection, name: &str, base64: &str) -> Result<StoredImage>;

    /// Deletes by id. The backend sweeps every collection directory for
    /// the id, so no collection parameter is needed.
    async fn remove(&self, id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_ids_are_not_bare_filenames() {
        assert!(is_bare_filename("asset_v1_1754300000000.png"));
        assert!(!is_bare_filename("../etc/passwd"));
        assert!(!is_bare_filename("sub/dir.png"));
        assert!(!is_bare_filename("..\\boot.ini"));
        assert!(!is_bare_filename(".."));
        assert!(!is_bare_filename(""));
    }
}
