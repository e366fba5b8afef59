pub mod client;
pub mod response;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{GenerationPayload, ImageReference};

pub use client::{WebhookClient, INVOKE_TIMEOUT};
pub use response::{interpret_error_body, normalize_json_reply, normalize_reply};

/// The orchestrator-facing seam: anything that can turn a payload into
/// one image reference. The production implementation is
/// [`WebhookClient`].
#[async_trait]
pub trait WorkflowInvoker: Send + Sync {
    async fn invoke(
        &self,
        payload: &GenerationPayload,
        endpoint_url: &str,
    ) -> Result<ImageReference>;
}
