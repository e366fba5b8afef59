use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};
use crate::models::storage::ImageMetadata;
use crate::prompt::{construct_prompt, format_headline};

/// Everything a single submission carries, straight from the form.
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
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
    pub important: String,
    pub generation_count: u8,
    pub source_image: Option<String>,
    pub endpoint_url: String,
}

impl GenerationRequest {
    pub fn has_headline(&self) -> bool {
        !self.headline_line1.trim().is_empty()
            || !self.headline_line2.trim().is_empty()
            || !self.headline_line3.trim().is_empty()
    }

    /// A request is generatable when a topic is present, or a subline
    /// together with at least one headline line.
    pub fn has_required_inputs(&self) -> bool {
        !self.topic.trim().is_empty() || (!self.subline.trim().is_empty() && self.has_headline())
    }

    /// Submission gate: the required inputs, and a non-empty "important"
    /// field whenever a topic is set.
    pub fn validate(&self) -> Result<()> {
        if !self.has_required_inputs() {
            return Err(StudioError::ValidationError(
                "Provide a topic, or a subline with at least one headline line".into(),
            ));
        }
        if !self.topic.trim().is_empty() && self.important.trim().is_empty() {
            return Err(StudioError::ValidationError(
                "The important field is required when a topic is set".into(),
            ));
        }
        Ok(())
    }

    /// Variant count pinned to the supported 1..=4 range.
    pub fn clamped_count(&self) -> usize {
        self.generation_count.clamp(1, 4) as usize
    }

    /// Rebuilds a request from archived metadata for the regeneration
    /// path: always a single variant, never a source image (the remote
    /// workflow synthesizes a fresh background).
    pub fn from_metadata(metadata: &ImageMetadata, endpoint_url: impl Into<String>) -> Self {
        GenerationRequest {
            topic: metadata.topic.clone(),
            headline_line1: metadata.headline_line1.clone(),
            headline_line2: metadata.headline_line2.clone(),
            headline_line3: metadata.headline_line3.clone(),
            subline: metadata.subline.clone(),
            background_info: metadata.background_info.clone(),
            headline_fixed: metadata.headline_fixed,
            subline_fixed: metadata.subline_fixed,
            include_person: metadata.include_person,
            person_description: metadata.person_description.clone(),
            important: metadata.important.clone().unwrap_or_default(),
            generation_count: 1,
            source_image: None,
            endpoint_url: endpoint_url.into(),
        }
    }

    /// The metadata snapshot archived next to every variant of this
    /// request, sufficient to regenerate it later.
    pub fn metadata_snapshot(&self) -> ImageMetadata {
        ImageMetadata {
            topic: self.topic.clone(),
            headline_line1: self.headline_line1.clone(),
            headline_line2: self.headline_line2.clone(),
            headline_line3: self.headline_line3.clone(),
            subline: self.subline.clone(),
            background_info: self.background_info.clone(),
            headline_fixed: self.headline_fixed,
            subline_fixed: self.subline_fixed,
            include_person: self.include_person,
            person_description: self.person_description.clone(),
            important: Some(self.important.clone()),
        }
    }
}

/// The wire shape POSTed to the generation webhook.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationPayload {
    pub chat_input: String,
    pub headline: String,
    pub subline: String,
    pub background_info: String,
    pub headline_fixed: bool,
    pub subline_fixed: bool,
    pub important: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_image: Option<String>,
}

impl GenerationPayload {
    /// Derives the payload from a request. Deterministic; the optional
    /// image is the already-compressed data URL, never the raw upload.
    pub fn build(request: &GenerationRequest, custom_image: Option<String>) -> Self {
        GenerationPayload {
            chat_input: construct_prompt(request),
            headline: format_headline(
                &request.headline_line1,
                &request.headline_line2,
                &request.headline_line3,
            ),
            subline: request.subline.clone(),
            background_info: request.background_info.clone(),
            headline_fixed: request.headline_fixed,
            subline_fixed: request.subline_fixed,
            important: request.important.clone(),
            custom_image,
        }
    }
}

/// One image coming back from the webhook, before archival.
#[derive(Debug, Clone, PartialEq)]
pub enum ImageReference {
    /// A self-describing `data:` URL, storable as-is.
    Encoded(String),
    /// The raw reply body of a binary response; ephemeral until encoded.
    Binary { bytes: Vec<u8>, mime: String },
}

/// Generation lifecycle phases. The orchestrator is the only writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    #[default]
    Idle,
    ProcessingImage,
    CommunicatingWebhook,
    Success,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> GenerationRequest {
        GenerationRequest {
            topic: "Quarterly results".into(),
            important: "Q3 numbers, blue palette".into(),
            generation_count: 1,
            endpoint_url: "https://workflows.example.com/webhook/a".into(),
            ..Default::default()
        }
    }

    #[test]
    fn topic_alone_satisfies_required_inputs() {
        assert!(base_request().has_required_inputs());
    }

    #[test]
    fn subline_requires_a_headline_line() {
        let request = GenerationRequest {
            subline: "A subline".into(),
            ..Default::default()
        };
        assert!(!request.has_required_inputs());

        let request = GenerationRequest {
            subline: "A subline".into(),
            headline_line2: "Line".into(),
            ..Default::default()
        };
        assert!(request.has_required_inputs());
    }

    #[test]
    fn blank_everything_is_rejected() {
        let request = GenerationRequest::default();
        assert!(!request.has_required_inputs());
        assert!(request.validate().is_err());
    }

    #[test]
    fn topic_without_important_blocks_submission() {
        let request = GenerationRequest {
            important: String::new(),
            ..base_request()
        };
        assert!(request.has_required_inputs());
        assert!(matches!(
            request.validate(),
            Err(StudioError::ValidationError(_))
        ));
    }

    #[test]
    fn headline_route_does_not_need_important() {
        let request = GenerationRequest {
            subline: "Sub".into(),
            headline_line1: "Head".into(),
            ..Default::default()
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn count_is_clamped_to_supported_range() {
        let mut request = base_request();
        request.generation_count = 0;
        assert_eq!(request.clamped_count(), 1);
        request.generation_count = 9;
        assert_eq!(request.clamped_count(), 4);
    }

    #[test]
    fn payload_build_is_deterministic() {
        let request = base_request();
        let a = GenerationPayload::build(&request, None);
        let b = GenerationPayload::build(&request, None);
        assert_eq!(a, b);
    }

    #[test]
    fn payload_serializes_camel_case_and_skips_missing_image() {
        let payload = GenerationPayload::build(&base_request(), None);
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("chatInput").is_some());
        assert!(json.get("backgroundInfo").is_some());
        assert!(json.get("customImage").is_none());
    }

    #[test]
    fn regeneration_request_forces_single_variant_without_image() {
        let metadata = base_request().metadata_snapshot();
        let request = GenerationRequest::from_metadata(&metadata, "https://example.com/hook");
        assert_eq!(request.generation_count, 1);
        assert!(request.source_image.is_none());
        assert_eq!(request.topic, "Quarterly results");
        assert_eq!(request.important, "Q3 numbers, blue palette");
    }
}
