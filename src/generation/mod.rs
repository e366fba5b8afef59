use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use futures::future::try_join_all;

use crate::error::{Result, StudioError};
use crate::imaging;
use crate::models::{
    GenerationPayload, GenerationRequest, ImageMetadata, ImageReference, Phase,
};
use crate::storage::StorageManager;
use crate::webhook::WorkflowInvoker;

/// Rotating status lines shown while the webhook renders. Cosmetic
/// only; the rotation carries no control semantics.
pub const STATUS_PHRASES: [&str; 4] = [
    "Synthesizing Prompt...",
    "Establishing Secure Uplink...",
    "Rendering Engine Active...",
    "Finalizing Asset Pixels...",
];

const STATUS_ROTATION_INTERVAL: Duration = Duration::from_millis(2500);

/// Fallback archive base name for requests without a topic.
const FALLBACK_BASE_NAME: &str = "asset";
const BASE_NAME_MAX_LEN: usize = 60;

#[derive(Debug, Default)]
struct EngineState {
    phase: Phase,
    status_detail: Option<String>,
    results: Vec<String>,
    error: Option<String>,
}

/// Read-only view of the engine for the UI.
#[derive(Debug, Clone)]
pub struct EngineSnapshot {
    pub phase: Phase,
    pub status_detail: Option<String>,
    pub results: Vec<String>,
    pub error: Option<String>,
}

/// Sequences one generation: validation, image pre-processing, the
/// concurrent webhook batch, and archival of every variant. At most one
/// generation is in flight; re-entry while busy is a silent no-op.
#[derive(Clone)]
pub struct GenerationEngine {
    invoker: Arc<dyn WorkflowInvoker>,
    storage: Arc<StorageManager>,
    state: Arc<Mutex<EngineState>>,
}

impl GenerationEngine {
    pub fn new(invoker: Arc<dyn WorkflowInvoker>, storage: Arc<StorageManager>) -> Self {
        Self {
            invoker,
            storage,
            state: Arc::new(Mutex::new(EngineState::default())),
        }
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let state = self.state.lock().unwrap();
        EngineSnapshot {
            phase: state.phase,
            status_detail: state.status_detail.clone(),
            results: state.results.clone(),
            error: state.error.clone(),
        }
    }

    /// Runs a full generation. Invalid requests fail without touching
    /// engine state; a busy engine ignores the call.
    pub async fn generate(&self, request: GenerationRequest) -> Result<()> {
        request.validate()?;

        if !self.begin() {
            log::debug!("Generation already in flight, ignoring request");
            return Ok(());
        }

        let outcome = self.run(request).await;
        if let Err(e) = &outcome {
            log::error!("Generation failed: {}", e);
            self.fail(e);
        }
        outcome
    }

    /// Replays an archived request: a single variant, no source image;
    /// the remote workflow synthesizes a fresh background.
    pub async fn regenerate(&self, metadata: &ImageMetadata, endpoint_url: &str) -> Result<()> {
        self.generate(GenerationRequest::from_metadata(metadata, endpoint_url))
            .await
    }

    /// Clears status, results and error unconditionally. Does not abort
    /// outstanding network calls or their archival side effects.
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap();
        state.phase = Phase::Idle;
        state.status_detail = None;
        state.results.clear();
        state.error = None;
    }

    async fn run(&self, request: GenerationRequest) -> Result<()> {
        let custom_image = match &request.source_image {
            Some(source) => Some(imaging::compress_image(source).await?),
            None => None,
        };

        let payload = GenerationPayload::build(&request, custom_image);

        self.set_phase(Phase::CommunicatingWebhook);
        self.set_detail(Some(STATUS_PHRASES[0]));
        let rotation = self.spawn_status_rotation();

        let count = request.clamped_count();
        log::info!(
            "Dispatching {} generation call(s) to {}",
            count,
            request.endpoint_url
        );
        let _batch_timer = crate::logger::timer("generation batch");

        let calls = (0..count).map(|_| self.invoker.invoke(&payload, &request.endpoint_url));
        let joined = try_join_all(calls).await;
        rotation.abort();

        // All-or-nothing: the first failure discards every sibling result.
        let references = joined?;

        let results: Vec<String> = references
            .into_iter()
            .map(|reference| match reference {
                ImageReference::Encoded(url) => url,
                ImageReference::Binary { bytes, mime } => imaging::encode_data_url(&mime, &bytes),
            })
            .collect();

        {
            let mut state = self.state.lock().unwrap();
            state.results = results.clone();
            state.phase = Phase::Success;
            state.status_detail = None;
        }

        self.archive_results(&request, &results).await.map_err(|e| {
            log::warn!(
                "Remote generation succeeded but archival failed, reporting as error: {}",
                e
            );
            e
        })?;

        self.set_phase(Phase::Idle);
        Ok(())
    }

    async fn archive_results(&self, request: &GenerationRequest, results: &[String]) -> Result<()> {
        let timestamp = Utc::now().timestamp_millis();
        let base_name = archive_base_name(&request.topic);
        let metadata = request.metadata_snapshot();

        let writes = results.iter().enumerate().map(|(idx, data)| {
            let filename = format!("{}_v{}_{}.png", base_name, idx + 1, timestamp);
            let storage = Arc::clone(&self.storage);
            let metadata = metadata.clone();
            async move {
                storage
                    .archive_with_metadata(&filename, data, Some(&metadata))
                    .await
            }
        });

        let archived = try_join_all(writes).await?;
        log::info!("Archived {} variant(s) as {}_v*", archived.len(), base_name);
        Ok(())
    }

    /// Atomic idle check plus transition into ProcessingImage; clears
    /// the leftovers of the previous run.
    fn begin(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        if state.phase != Phase::Idle {
            return false;
        }
        state.phase = Phase::ProcessingImage;
        state.status_detail = None;
        state.results.clear();
        state.error = None;
        true
    }

    fn set_phase(&self, phase: Phase) {
        self.state.lock().unwrap().phase = phase;
    }

    fn set_detail(&self, detail: Option<&str>) {
        self.state.lock().unwrap().status_detail = detail.map(str::to_string);
    }

    fn fail(&self, error: &StudioError) {
        let mut state = self.state.lock().unwrap();
        state.phase = Phase::Error;
        state.error = Some(error.to_string());
    }

    fn spawn_status_rotation(&self) -> tokio::task::JoinHandle<()> {
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(STATUS_ROTATION_INTERVAL);
            interval.tick().await;
            let mut idx = 0;
            loop {
                interval.tick().await;
                if idx < STATUS_PHRASES.len() - 1 {
                    idx += 1;
                    let mut state = state.lock().unwrap();
                    if state.phase == Phase::CommunicatingWebhook {
                        state.status_detail = Some(STATUS_PHRASES[idx].to_string());
                    }
                }
            }
        })
    }
}

/// Filesystem-safe base name derived from the topic: alphanumeric runs
/// survive, everything else collapses to single underscores, capped at
/// 60 characters, with a fixed fallback for empty topics.
fn archive_base_name(topic: &str) -> String {
    if topic.is_empty() {
        return FALLBACK_BASE_NAME.to_string();
    }
    let mut base = String::new();
    for ch in topic.chars() {
        if ch.is_ascii_alphanumeric() {
            base.push(ch);
        } else if !base.ends_with('_') {
            base.push('_');
        }
    }
    base.chars().take(BASE_NAME_MAX_LEN).collect()
}
