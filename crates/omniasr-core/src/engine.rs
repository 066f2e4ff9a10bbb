//! Engine facade tying intake, normalization and scheduling together.

use std::sync::Arc;

use tracing::{debug, info};
use uuid::Uuid;

use crate::audio;
use crate::card::ModelCard;
use crate::config::EngineConfig;
use crate::device::Device;
use crate::error::Result;
use crate::languages;
use crate::scheduler::{BatchScheduler, PendingRequest};
use crate::worker::{AsrBackend, BatchInput, SidecarBackend};

/// A completed transcription.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    /// Canonical tag actually passed to the model, if any.
    pub language: Option<String>,
    pub duration_secs: f32,
}

/// The serving engine: one loaded model behind a batching scheduler.
///
/// Constructed once at startup and handed to the HTTP layer; there is no
/// ambient global instance.
pub struct AsrEngine {
    config: EngineConfig,
    card: ModelCard,
    scheduler: BatchScheduler,
}

impl AsrEngine {
    /// Load the configured model in the sidecar and start the scheduler.
    /// Must run inside a tokio runtime. A load failure is fatal to the
    /// caller: no request can be served without a model.
    pub fn load(config: EngineConfig) -> Result<Self> {
        let card = ModelCard::parse(&config.model_card);
        let device = Device::detect();
        info!(card = %card, device = %device, "Initializing ASR engine");

        let backend = SidecarBackend::load(&card, device)?;
        Ok(Self::with_backend(config, backend))
    }

    /// Build an engine around an already-loaded backend. This is the
    /// dependency-injection seam used by tests and embedders.
    pub fn with_backend(config: EngineConfig, backend: Arc<dyn AsrBackend>) -> Self {
        let card = ModelCard::parse(&config.model_card);
        let scheduler = BatchScheduler::new(
            backend,
            config.max_batch_size,
            config.batch_timeout(),
            config.queue_capacity,
            config.workers_per_device,
        );
        Self {
            config,
            card,
            scheduler,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn model_card(&self) -> &ModelCard {
        &self.card
    }

    /// Validate, admit and transcribe one upload. Suspends until the
    /// batch containing the request completes.
    pub async fn transcribe(
        &self,
        bytes: &[u8],
        language: Option<&str>,
    ) -> Result<Transcription> {
        let decoded = audio::admit(bytes, self.card.max_audio_secs())?;
        let duration_secs = decoded.duration_secs();

        // CTC-style cards ignore the hint entirely; normalizing for them
        // would only fabricate a language claim in the response.
        let language = if self.card.is_language_conditioned() {
            language.map(languages::normalize)
        } else {
            None
        };

        let request = PendingRequest {
            id: Uuid::new_v4().to_string(),
            input: BatchInput {
                samples: decoded.samples,
                sample_rate: decoded.sample_rate,
                language: language.clone(),
            },
        };
        debug!(
            id = %request.id,
            duration_secs,
            language = language.as_deref().unwrap_or("auto"),
            "Admitting transcription request"
        );

        let text = self.scheduler.submit(request).await?;
        Ok(Transcription {
            text,
            language,
            duration_secs,
        })
    }
}
