use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{Result, StudioError};
use crate::models::{GenerationPayload, ImageReference};
use crate::webhook::response::{interpret_error_body, normalize_reply};
use crate::webhook::WorkflowInvoker;

/// Hard ceiling for a single generation call.
pub const INVOKE_TIMEOUT: Duration = Duration::from_secs(300);

/// Client for the remote generation webhook. One request per call, no
/// internal retry; the reply is normalized into a single image
/// reference.
#[derive(Clone)]
pub struct WebhookClient {
    client: Client,
    timeout: Duration,
}

impl WebhookClient {
    pub fn new() -> Self {
        Self::with_timeout(INVOKE_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            timeout,
        }
    }
}

impl Default for WebhookClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkflowInvoker for WebhookClient {
    async fn invoke(
        &self,
        payload: &GenerationPayload,
        endpoint_url: &str,
    ) -> Result<ImageReference> {
        log::info!("Invoking generation webhook: {}", endpoint_url);

        let response = self
            .client
            .post(endpoint_url)
            .json(payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    log::error!("Webhook call timed out after {:?}", self.timeout);
                    StudioError::Timeout
                } else {
                    log::error!("Webhook call failed: {}", e);
                    StudioError::ConnectionFailed(format!(
                        "{} (the server might be blocking the request or the URL is incorrect)",
                        e
                    ))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::error!("Webhook returned {}: {}", status, body);
            return Err(interpret_error_body(status.as_u16(), &body));
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(|e| {
            StudioError::ConnectionFailed(format!("failed to read webhook reply: {}", e))
        })?;

        log::debug!(
            "Webhook reply: {} bytes, content-type {:?}",
            body.len(),
            content_type
        );

        normalize_reply(content_type.as_deref(), &body)
    }
}
