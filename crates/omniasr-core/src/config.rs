//! Configuration for the engine and the HTTP server.
//!
//! Everything is environment-driven (`OMNIASR_*`); serde defaults keep the
//! structs usable from config files as well.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Engine configuration: which model to serve and how to batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Model card to load, e.g. `omniASR_CTC_1B_v2`.
    #[serde(default = "default_model_card")]
    pub model_card: String,

    /// Maximum requests per inference batch.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// How long an open batch waits for more requests before dispatching.
    #[serde(default = "default_batch_timeout_ms")]
    pub batch_timeout_ms: u64,

    /// Bound on the pending queue; submissions beyond it are rejected.
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Dispatch loops per device. 1 keeps a single batch in flight.
    #[serde(default = "default_workers")]
    pub workers_per_device: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_card: default_model_card(),
            max_batch_size: default_max_batch_size(),
            batch_timeout_ms: default_batch_timeout_ms(),
            queue_capacity: default_queue_capacity(),
            workers_per_device: default_workers(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let max_batch_size = env_parse("OMNIASR_BATCH_SIZE", default_max_batch_size());
        Self {
            model_card: std::env::var("OMNIASR_MODEL").unwrap_or_else(|_| default_model_card()),
            max_batch_size,
            batch_timeout_ms: env_parse("OMNIASR_BATCH_TIMEOUT_MS", default_batch_timeout_ms()),
            queue_capacity: env_parse("OMNIASR_QUEUE_CAPACITY", max_batch_size * 4),
            workers_per_device: env_parse("OMNIASR_WORKERS", default_workers()),
        }
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_millis(self.batch_timeout_ms)
    }
}

fn default_model_card() -> String {
    "omniASR_CTC_1B_v2".to_string()
}

fn default_max_batch_size() -> usize {
    4
}

fn default_batch_timeout_ms() -> u64 {
    50
}

fn default_queue_capacity() -> usize {
    default_max_batch_size() * 4
}

fn default_workers() -> usize {
    1
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("OMNIASR_HOST").unwrap_or_else(|_| default_host()),
            port: env_parse("OMNIASR_PORT", default_port()),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn env_parse<T: FromStr + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(key, value = %raw, "Invalid value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = EngineConfig::default();
        assert_eq!(config.model_card, "omniASR_CTC_1B_v2");
        assert_eq!(config.max_batch_size, 4);
        assert_eq!(config.batch_timeout(), Duration::from_millis(50));
        assert!(config.queue_capacity >= config.max_batch_size);
        assert_eq!(config.workers_per_device, 1);
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"model_card":"omniASR_LLM_1B_v2","max_batch_size":8}"#)
                .unwrap();
        assert_eq!(config.model_card, "omniASR_LLM_1B_v2");
        assert_eq!(config.max_batch_size, 8);
        assert_eq!(config.batch_timeout_ms, 50);
    }
}
