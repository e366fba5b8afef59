use serde::{Deserialize, Serialize};

/// The request parameters archived next to an image so a variant can be
/// regenerated later. Mirrors the form fields, not the wire payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub topic: String,
    pub headline_line1: String,
    pub headline_line2: String,
    pub headline_line3: String,
    pub subline: String,
    pub background_info: String,
    pub headline_fixed: bool,
    pub subline_fixed: bool,
    pub include_person: bool,
    pub person_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub important: Option<String>,
}

/// One entry of a file-backed gallery as the backend reports it. The id
/// is filesystem-derived and opaque to callers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredImage {
    pub id: String,
    pub name: String,
    pub url: String,
    /// Millisecond timestamp assigned by the backend.
    pub timestamp: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ImageMetadata>,
}

/// Reply envelope of the save endpoints.
#[derive(Debug, Deserialize)]
pub struct SaveImageResponse {
    pub success: bool,
    pub image: StoredImage,
}

/// Reply envelope of the delete endpoint.
#[derive(Debug, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}
