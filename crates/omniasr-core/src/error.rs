//! Core error taxonomy.
//!
//! Every failure the gateway can surface is a typed variant here so the
//! HTTP layer dispatches on a tag instead of inspecting message strings.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Upload contained no bytes.
    #[error("Empty file provided")]
    EmptyAudio,

    /// Container or codec could not be parsed.
    #[error("Could not decode audio file: {0}")]
    AudioDecode(String),

    /// Audio duration exceeds the loaded model's ceiling.
    #[error("Audio file is too long: {actual:.1}s exceeds the maximum of {limit:.0}s")]
    AudioTooLong { actual: f32, limit: f32 },

    /// Model failed to load at startup. There is no degraded mode; the
    /// process aborts on this.
    #[error("Failed to load model {card}: {reason}")]
    ModelLoad { card: String, reason: String },

    /// Model execution failure surfaced by the inference worker.
    #[error("Transcription failed: {0}")]
    Inference(String),

    /// Pending queue is at capacity; the client should retry with backoff.
    #[error("Transcription queue is full")]
    QueueFull,

    /// Scheduler dispatch loops have shut down.
    #[error("Batch scheduler is offline")]
    SchedulerOffline,
}
