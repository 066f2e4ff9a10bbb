//! End-to-end route tests against a mocked inference backend.

use std::io::Cursor;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use omniasr_core::{AsrBackend, AsrEngine, BatchInput, EngineConfig};
use omniasr_server::{create_router, AppState};

const BOUNDARY: &str = "omniasr-test-boundary";

/// Returns a fixed transcript per item and records the language hints.
struct StubBackend {
    transcript: &'static str,
    languages: Mutex<Vec<Option<String>>>,
}

impl StubBackend {
    fn new(transcript: &'static str) -> Arc<Self> {
        Arc::new(Self {
            transcript,
            languages: Mutex::new(Vec::new()),
        })
    }
}

impl AsrBackend for StubBackend {
    fn transcribe_batch(
        &self,
        batch: &[BatchInput],
    ) -> omniasr_core::Result<Vec<omniasr_core::Result<String>>> {
        let mut languages = self.languages.lock().unwrap();
        Ok(batch
            .iter()
            .map(|input| {
                languages.push(input.language.clone());
                Ok(self.transcript.to_string())
            })
            .collect())
    }
}

fn app_with(model_card: &str, backend: Arc<dyn AsrBackend>) -> axum::Router {
    let config = EngineConfig {
        model_card: model_card.to_string(),
        batch_timeout_ms: 5,
        ..EngineConfig::default()
    };
    create_router(AppState::new(AsrEngine::with_backend(config, backend)))
}

fn app() -> axum::Router {
    app_with("omniASR_CTC_1B_v2", StubBackend::new("hello world"))
}

fn wav_bytes(seconds: f32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16_000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..(seconds * 16_000.0) as usize {
            writer.write_sample((i % 64) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Build a multipart/form-data body. `file` is added with a filename,
/// other entries as plain text fields.
fn multipart_body(file: Option<&[u8]>, fields: &[(&str, &str)]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(bytes) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"audio.wav\"\r\nContent-Type: audio/wav\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n")
                .as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn transcription_request(file: Option<&[u8]>, fields: &[(&str, &str)]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/audio/transcriptions")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(file, fields)))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

#[tokio::test]
async fn health_endpoints_return_ok() {
    for uri in ["/health", "/health-check"] {
        let response = app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_bytes(response).await, b"\"ok\"");
    }
}

#[tokio::test]
async fn models_lists_the_configured_card() {
    let response = app()
        .oneshot(Request::get("/v1/models").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["object"], "list");
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    let model = &json["data"][0];
    assert_eq!(model["id"], "omniASR_CTC_1B_v2");
    assert_eq!(model["object"], "model");
    assert_eq!(model["created"], 0);
    assert_eq!(model["owned_by"], "omnilingual-asr");
}

#[tokio::test]
async fn missing_file_is_a_400_without_code() {
    let response = app()
        .oneshot(transcription_request(None, &[("model", "whatever")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "No file provided");
    assert_eq!(json["error"]["type"], "invalid_request_error");
    assert_eq!(json["error"]["param"], "file");
    assert!(json["error"].get("code").is_none());
}

#[tokio::test]
async fn empty_file_is_a_400_without_code() {
    let response = app()
        .oneshot(transcription_request(Some(&[]), &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["message"], "Empty file provided");
    assert!(json["error"].get("code").is_none());
}

#[tokio::test]
async fn undecodable_file_reports_invalid_audio_format() {
    let response = app()
        .oneshot(transcription_request(Some(b"not really audio"), &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "invalid_audio_format");
    assert_eq!(json["error"]["param"], "file");
}

#[tokio::test]
async fn over_long_file_reports_invalid_audio_length() {
    let response = app()
        .oneshot(transcription_request(Some(&wav_bytes(41.0)), &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "invalid_audio_length");
}

#[tokio::test]
async fn json_format_is_the_default() {
    let response = app()
        .oneshot(transcription_request(Some(&wav_bytes(1.0)), &[]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json, serde_json::json!({"text": "hello world"}));
}

#[tokio::test]
async fn text_format_returns_the_raw_transcript() {
    let response = app()
        .oneshot(transcription_request(
            Some(&wav_bytes(1.0)),
            &[("response_format", "text")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"hello world");
}

#[tokio::test]
async fn verbose_json_carries_a_single_synthetic_segment() {
    let response = app()
        .oneshot(transcription_request(
            Some(&wav_bytes(2.0)),
            &[("response_format", "verbose_json"), ("language", "en")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["task"], "transcribe");
    assert_eq!(json["text"], "hello world");
    // CTC card: the engine ignores the hint, the raw request value echoes.
    assert_eq!(json["language"], "en");
    let segments = json["segments"].as_array().unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0]["start"], 0.0);
    assert!((segments[0]["end"].as_f64().unwrap() - 2.0).abs() < 0.05);
    assert_eq!(json["words"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn srt_and_vtt_emit_one_cue_spanning_the_audio() {
    let response = app()
        .oneshot(transcription_request(
            Some(&wav_bytes(2.0)),
            &[("response_format", "srt")],
        ))
        .await
        .unwrap();
    let srt = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:02,000"));
    assert!(srt.contains("hello world"));

    let response = app()
        .oneshot(transcription_request(
            Some(&wav_bytes(2.0)),
            &[("response_format", "vtt")],
        ))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/vtt; charset=utf-8"
    );
    let vtt = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(vtt.starts_with("WEBVTT\n\n00:00:00.000 --> 00:00:02.000"));
}

#[tokio::test]
async fn unsupported_format_is_rejected_before_inference() {
    let response = app()
        .oneshot(transcription_request(
            Some(&wav_bytes(1.0)),
            &[("response_format", "yaml")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    assert_eq!(json["error"]["param"], "response_format");
}

#[tokio::test]
async fn llm_card_normalizes_language_before_the_backend() {
    let backend = StubBackend::new("bonjour");
    let app = app_with("omniASR_LLM_1B_v2", backend.clone());

    let response = app
        .oneshot(transcription_request(
            Some(&wav_bytes(1.0)),
            &[("language", "ENGLISH"), ("response_format", "verbose_json")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["language"], "eng_Latn");
    assert_eq!(
        backend.languages.lock().unwrap().as_slice(),
        &[Some("eng_Latn".to_string())]
    );
}
