//! Inference worker boundary.
//!
//! The trained model is an external collaborator. [`AsrBackend`] is the
//! seam: one blocking invocation per batch, results positionally aligned
//! with the inputs. The default implementation, [`SidecarBackend`],
//! drives a persistent Python daemon hosting the Omnilingual-ASR pipeline
//! over a Unix socket with length-prefixed JSON frames.

use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::audio::encode_wav;
use crate::card::ModelCard;
use crate::device::Device;
use crate::error::{Error, Result};

/// One request's share of a batch, as handed to the worker.
#[derive(Debug, Clone)]
pub struct BatchInput {
    /// Mono PCM in [-1.0, 1.0].
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    /// Canonical language tag, present only for language-conditioned cards.
    pub language: Option<String>,
}

/// A loaded model bound to one device.
///
/// `transcribe_batch` blocks for the duration of model computation and is
/// never invoked concurrently by the scheduler. The inner `Result` carries
/// per-item failures; the outer `Err` fails the whole batch.
pub trait AsrBackend: Send + Sync {
    fn transcribe_batch(&self, batch: &[BatchInput]) -> Result<Vec<Result<String>>>;
}

const DEFAULT_SOCKET_PATH: &str = "/tmp/omniasr_daemon.sock";
const DAEMON_SCRIPT: &str = "scripts/asr_daemon.py";
const DAEMON_START_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Serialize)]
struct SidecarRequest<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    model_card: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    device: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    items: Vec<SidecarItem>,
}

#[derive(Debug, Serialize)]
struct SidecarItem {
    audio_base64: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    language: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SidecarResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    results: Option<Vec<SidecarResult>>,
}

#[derive(Debug, Deserialize)]
struct SidecarResult {
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Bridge to the Python daemon that owns the actual model weights.
pub struct SidecarBackend {
    socket_path: PathBuf,
    card: ModelCard,
    daemon_process: Mutex<Option<Child>>,
}

impl SidecarBackend {
    /// Spawn the sidecar, wait for readiness and load the model. Fails
    /// with [`Error::ModelLoad`] on any setup problem; there is no
    /// degraded mode, so callers abort startup on error.
    pub fn load(card: &ModelCard, device: Device) -> Result<Arc<Self>> {
        let socket_path = std::env::var("OMNIASR_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SOCKET_PATH));

        let backend = Self {
            socket_path,
            card: card.clone(),
            daemon_process: Mutex::new(None),
        };

        backend.ensure_daemon_running()?;

        info!(card = %card, device = %device, "Loading model in sidecar");
        let response = backend.call(&SidecarRequest {
            command: "load",
            model_card: Some(card.as_str()),
            device: Some(device.as_str()),
            items: Vec::new(),
        })?;

        if let Some(err) = response.error {
            return Err(Error::ModelLoad {
                card: card.as_str().to_string(),
                reason: err,
            });
        }
        info!(card = %card, "Model loaded");

        Ok(Arc::new(backend))
    }

    fn ensure_daemon_running(&self) -> Result<()> {
        if self.check().is_ok() {
            debug!("ASR daemon already running");
            return Ok(());
        }

        let python_cmd =
            std::env::var("OMNIASR_PYTHON").unwrap_or_else(|_| "python3".to_string());
        let script = std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DAEMON_SCRIPT);

        info!(script = %script.display(), "Starting ASR daemon");
        let child = Command::new(&python_cmd)
            .arg(&script)
            .arg("--socket")
            .arg(&self.socket_path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| self.load_error(format!("failed to start daemon: {e}")))?;

        {
            let mut guard = self.daemon_process.lock().expect("daemon mutex poisoned");
            *guard = Some(child);
        }

        let deadline = std::time::Instant::now() + DAEMON_START_TIMEOUT;
        while std::time::Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(100));
            if self.socket_path.exists() && self.check().is_ok() {
                info!("ASR daemon ready");
                return Ok(());
            }
        }

        Err(self.load_error(format!(
            "daemon did not become ready within {}s",
            DAEMON_START_TIMEOUT.as_secs()
        )))
    }

    fn check(&self) -> Result<()> {
        let response = self.call(&SidecarRequest {
            command: "check",
            model_card: None,
            device: None,
            items: Vec::new(),
        })?;
        match response.status.as_deref() {
            Some("ok") => Ok(()),
            other => Err(Error::Inference(format!(
                "daemon health check returned {other:?}"
            ))),
        }
    }

    fn connect(&self) -> Result<UnixStream> {
        let stream = UnixStream::connect(&self.socket_path)
            .map_err(|e| Error::Inference(format!("failed to connect to daemon: {e}")))?;
        stream
            .set_read_timeout(Some(Duration::from_secs(600)))
            .ok();
        stream.set_write_timeout(Some(Duration::from_secs(30))).ok();
        Ok(stream)
    }

    fn call(&self, request: &SidecarRequest<'_>) -> Result<SidecarResponse> {
        let mut stream = self.connect()?;

        let payload = serde_json::to_vec(request)
            .map_err(|e| Error::Inference(format!("failed to serialize request: {e}")))?;
        let length = (payload.len() as u32).to_be_bytes();
        stream
            .write_all(&length)
            .and_then(|_| stream.write_all(&payload))
            .and_then(|_| stream.flush())
            .map_err(|e| Error::Inference(format!("failed to write to daemon: {e}")))?;

        let mut length_buf = [0u8; 4];
        stream
            .read_exact(&mut length_buf)
            .map_err(|e| Error::Inference(format!("failed to read response length: {e}")))?;
        let mut body = vec![0u8; u32::from_be_bytes(length_buf) as usize];
        stream
            .read_exact(&mut body)
            .map_err(|e| Error::Inference(format!("failed to read response body: {e}")))?;

        serde_json::from_slice(&body).map_err(|e| {
            Error::Inference(format!(
                "failed to parse daemon response: {e} - {}",
                String::from_utf8_lossy(&body)
            ))
        })
    }

    fn load_error(&self, reason: String) -> Error {
        Error::ModelLoad {
            card: self.card.as_str().to_string(),
            reason,
        }
    }

    /// Stop the daemon if this process started it.
    pub fn shutdown(&self) {
        let _ = self.call(&SidecarRequest {
            command: "shutdown",
            model_card: None,
            device: None,
            items: Vec::new(),
        });

        let mut guard = self.daemon_process.lock().expect("daemon mutex poisoned");
        if let Some(mut child) = guard.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
    }
}

impl AsrBackend for SidecarBackend {
    fn transcribe_batch(&self, batch: &[BatchInput]) -> Result<Vec<Result<String>>> {
        let items = batch
            .iter()
            .map(|input| SidecarItem {
                audio_base64: base64::engine::general_purpose::STANDARD
                    .encode(encode_wav(&input.samples, input.sample_rate)),
                language: input.language.clone(),
            })
            .collect();

        let response = self.call(&SidecarRequest {
            command: "transcribe",
            model_card: None,
            device: None,
            items,
        })?;

        if let Some(err) = response.error {
            return Err(Error::Inference(err));
        }

        let results = response
            .results
            .ok_or_else(|| Error::Inference("daemon returned no results".to_string()))?;
        if results.len() != batch.len() {
            return Err(Error::Inference(format!(
                "daemon returned {} results for {} requests",
                results.len(),
                batch.len()
            )));
        }

        Ok(results
            .into_iter()
            .map(|r| match (r.text, r.error) {
                (_, Some(err)) => Err(Error::Inference(err)),
                (Some(text), None) => Ok(text),
                (None, None) => Err(Error::Inference("daemon returned empty result".to_string())),
            })
            .collect())
    }
}

impl std::fmt::Debug for SidecarBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SidecarBackend")
            .field("socket_path", &self.socket_path)
            .field("card", &self.card)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daemon_frames_serialize_expected_shape() {
        let request = SidecarRequest {
            command: "transcribe",
            model_card: None,
            device: None,
            items: vec![SidecarItem {
                audio_base64: "AAAA".to_string(),
                language: Some("eng_Latn".to_string()),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["command"], "transcribe");
        assert!(json.get("model_card").is_none());
        assert_eq!(json["items"][0]["language"], "eng_Latn");
    }

    #[test]
    fn per_item_errors_deserialize() {
        let raw = r#"{"results":[{"text":"hello"},{"error":"corrupt audio"}]}"#;
        let response: SidecarResponse = serde_json::from_str(raw).unwrap();
        let results = response.results.unwrap();
        assert_eq!(results[0].text.as_deref(), Some("hello"));
        assert_eq!(results[1].error.as_deref(), Some("corrupt audio"));
        assert!(response.status.is_none());
    }
}
