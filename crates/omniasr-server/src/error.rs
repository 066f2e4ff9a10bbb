//! OpenAI-compatible API error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// API error carrying everything the OpenAI error body needs.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub error_type: &'static str,
    pub param: Option<&'static str>,
    pub code: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Debug, Serialize)]
struct ErrorInfo {
    message: String,
    #[serde(rename = "type")]
    error_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    param: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<&'static str>,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
            error_type: "invalid_request_error",
            param: None,
            code: None,
        }
    }

    pub fn invalid_param(msg: impl Into<String>, param: &'static str) -> Self {
        Self {
            param: Some(param),
            ..Self::bad_request(msg)
        }
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.into(),
            error_type: "server_error",
            param: None,
            code: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: ErrorInfo {
                message: self.message,
                error_type: self.error_type,
                param: self.param,
                code: self.code,
            },
        });
        (self.status, body).into_response()
    }
}

/// Dispatch on the core's typed taxonomy; no message-string matching.
impl From<omniasr_core::Error> for ApiError {
    fn from(err: omniasr_core::Error) -> Self {
        use omniasr_core::Error;
        match &err {
            Error::EmptyAudio => ApiError::invalid_param(err.to_string(), "file"),
            Error::AudioDecode(_) => ApiError {
                code: Some("invalid_audio_format"),
                ..ApiError::invalid_param(
                    "Could not decode audio file. The file may be corrupted or in an \
                     unsupported format.",
                    "file",
                )
            },
            Error::AudioTooLong { .. } => ApiError {
                code: Some("invalid_audio_length"),
                ..ApiError::invalid_param(err.to_string(), "file")
            },
            Error::QueueFull => ApiError {
                status: StatusCode::TOO_MANY_REQUESTS,
                message: err.to_string(),
                error_type: "server_error",
                param: None,
                code: Some("queue_full"),
            },
            Error::ModelLoad { .. } | Error::Inference(_) | Error::SchedulerOffline => {
                ApiError::internal(err.to_string())
            }
        }
    }
}
