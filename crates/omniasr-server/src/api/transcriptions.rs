//! OpenAI Whisper-compatible transcription endpoint.

use axum::{
    body::Body,
    extract::{Multipart, State},
    http::header,
    response::Response,
};
use serde::Serialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default)]
struct TranscriptionForm {
    file: Option<Vec<u8>>,
    language: Option<String>,
    response_format: Option<String>,
    temperature: f32,
    // Accepted for API compatibility; not consumed by the engine.
    _model: Option<String>,
    _prompt: Option<String>,
    _timestamp_granularities: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResponseFormat {
    Json,
    Text,
    VerboseJson,
    Srt,
    Vtt,
}

impl ResponseFormat {
    fn parse(raw: Option<&str>) -> Result<Self, ApiError> {
        match raw.unwrap_or("json").to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            "verbose_json" => Ok(Self::VerboseJson),
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            other => Err(ApiError::invalid_param(
                format!(
                    "Unsupported response_format: {other}. \
                     Supported: json, verbose_json, text, srt, vtt"
                ),
                "response_format",
            )),
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonResponse {
    text: String,
}

#[derive(Debug, Serialize)]
struct VerboseJsonResponse {
    task: &'static str,
    language: String,
    duration: f32,
    text: String,
    segments: Vec<Segment>,
    words: Vec<Word>,
}

/// The model yields no sub-segment timing, so verbose output carries one
/// synthetic segment spanning the whole audio.
#[derive(Debug, Serialize)]
struct Segment {
    id: u32,
    seek: u32,
    start: f32,
    end: f32,
    text: String,
    temperature: f32,
    avg_logprob: f32,
    compression_ratio: f32,
    no_speech_prob: f32,
}

#[derive(Debug, Serialize)]
struct Word {
    word: String,
    start: f32,
    end: f32,
}

pub async fn transcribe(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let form = parse_form(multipart).await?;
    let format = ResponseFormat::parse(form.response_format.as_deref())?;

    let Some(file) = form.file else {
        return Err(ApiError::invalid_param("No file provided", "file"));
    };

    info!(
        bytes = file.len(),
        language = form.language.as_deref().unwrap_or("auto"),
        format = ?format,
        "Transcription request"
    );

    let result = state
        .engine
        .transcribe(&file, form.language.as_deref())
        .await?;

    let response = match format {
        ResponseFormat::Json => json_response(
            "application/json",
            &JsonResponse { text: result.text },
        ),
        ResponseFormat::VerboseJson => {
            let language = result
                .language
                .or(form.language)
                .unwrap_or_else(|| "unknown".to_string());
            json_response(
                "application/json",
                &VerboseJsonResponse {
                    task: "transcribe",
                    language,
                    duration: result.duration_secs,
                    segments: vec![Segment {
                        id: 0,
                        seek: 0,
                        start: 0.0,
                        end: result.duration_secs,
                        text: result.text.clone(),
                        temperature: form.temperature,
                        avg_logprob: 0.0,
                        compression_ratio: 1.0,
                        no_speech_prob: 0.0,
                    }],
                    words: Vec::new(),
                    text: result.text,
                },
            )
        }
        ResponseFormat::Text => {
            plain_response("text/plain; charset=utf-8", result.text)
        }
        ResponseFormat::Srt => plain_response(
            "text/plain; charset=utf-8",
            format_srt(&result.text, result.duration_secs),
        ),
        ResponseFormat::Vtt => plain_response(
            "text/vtt; charset=utf-8",
            format_vtt(&result.text, result.duration_secs),
        ),
    };
    Ok(response)
}

async fn parse_form(mut multipart: Multipart) -> Result<TranscriptionForm, ApiError> {
    let mut form = TranscriptionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed reading multipart 'file' field: {e}"))
                })?;
                form.file = Some(bytes.to_vec());
            }
            "language" => {
                let text = text_field(field, "language").await?;
                if !text.is_empty() {
                    form.language = Some(text);
                }
            }
            "response_format" => {
                let text = text_field(field, "response_format").await?;
                if !text.is_empty() {
                    form.response_format = Some(text);
                }
            }
            "temperature" => {
                let text = text_field(field, "temperature").await?;
                form.temperature = text.parse().unwrap_or(0.0);
            }
            "model" => {
                let text = text_field(field, "model").await?;
                if !text.is_empty() {
                    form._model = Some(text);
                }
            }
            "prompt" => {
                let text = text_field(field, "prompt").await?;
                if !text.is_empty() {
                    form._prompt = Some(text);
                }
            }
            "timestamp_granularities[]" | "timestamp_granularities" => {
                let text = text_field(field, "timestamp_granularities").await?;
                if !text.is_empty() {
                    form._timestamp_granularities.push(text);
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map(|t| t.trim().to_string())
        .map_err(|e| ApiError::bad_request(format!("Failed reading multipart '{name}' field: {e}")))
}

fn json_response<T: Serialize>(content_type: &'static str, body: &T) -> Response {
    let payload = serde_json::to_string(body).unwrap_or_default();
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(payload))
        .expect("static response parts")
}

fn plain_response(content_type: &'static str, body: String) -> Response {
    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body))
        .expect("static response parts")
}

fn format_srt(text: &str, duration_secs: f32) -> String {
    format!(
        "1\n{} --> {}\n{}\n",
        secs_to_srt(0.0),
        secs_to_srt(duration_secs),
        text.trim()
    )
}

fn format_vtt(text: &str, duration_secs: f32) -> String {
    format!(
        "WEBVTT\n\n{} --> {}\n{}\n",
        secs_to_vtt(0.0),
        secs_to_vtt(duration_secs),
        text.trim()
    )
}

fn secs_to_srt(secs: f32) -> String {
    let total_ms = (secs.max(0.0) * 1000.0).round() as u64;
    let ms = total_ms % 1000;
    let total_sec = total_ms / 1000;
    let s = total_sec % 60;
    let total_min = total_sec / 60;
    let m = total_min % 60;
    let h = total_min / 60;
    format!("{h:02}:{m:02}:{s:02},{ms:03}")
}

fn secs_to_vtt(secs: f32) -> String {
    secs_to_srt(secs).replace(',', ".")
}
