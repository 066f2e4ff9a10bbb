//! Omnilingual-ASR inference core.
//!
//! Turns many independent transcription requests into model-friendly
//! micro-batches and routes results back to their callers. The trained
//! speech model itself lives behind the [`AsrBackend`] trait; the default
//! implementation talks to a persistent Python sidecar over a Unix socket.
//!
//! # Example
//!
//! ```ignore
//! use omniasr_core::{AsrEngine, EngineConfig};
//!
//! let engine = AsrEngine::load(EngineConfig::from_env())?;
//! let result = engine.transcribe(&wav_bytes, Some("en")).await?;
//! println!("{}", result.text);
//! ```

pub mod audio;
pub mod card;
pub mod config;
pub mod device;
pub mod engine;
pub mod error;
pub mod languages;
pub mod scheduler;
pub mod worker;

pub use audio::DecodedAudio;
pub use card::ModelCard;
pub use config::{EngineConfig, ServerConfig};
pub use device::Device;
pub use engine::{AsrEngine, Transcription};
pub use error::{Error, Result};
pub use scheduler::{BatchScheduler, PendingRequest};
pub use worker::{AsrBackend, BatchInput, SidecarBackend};
