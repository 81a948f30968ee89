use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Cause of a microphone acquisition failure.
///
/// Each cause carries its own user-facing message so the front-end can show
/// what actually went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeviceError {
    /// The user or OS denied access to the input device
    #[error("Microphone access denied. Please allow microphone access and try again.")]
    PermissionDenied,

    /// No usable input device, or the device could not be opened
    #[error("Could not access microphone. Please ensure it is connected and enabled.")]
    Unavailable,

    /// Audio capture is not available in this build or environment
    #[error("Audio recording is not supported by this build.")]
    Unsupported,
}

/// Error taxonomy for the feedback pipeline.
///
/// Each failure class the caller must distinguish gets its own variant.
/// HTTP handlers render them through [`IntoResponse`] as a status code plus
/// a JSON error body.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing credential. Detected before any network attempt.
    #[error("API key is not configured. Please set the GEMINI_API_KEY environment variable.")]
    Configuration,

    /// Microphone acquisition failed
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Transcription request failed in transport or at the service
    #[error("Transcription failed: {0}")]
    Transcription(String),

    /// Analysis request failed in transport or at the service
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// Model reply was not valid JSON after de-fencing.
    /// Carries a bounded prefix of the raw reply for diagnostics.
    #[error("Failed to parse analysis data. Raw response: {excerpt}...")]
    Parse { excerpt: String },

    /// Reply parsed as JSON but a required field is missing or mistyped
    #[error("Received malformed analysis data: {field} {problem}")]
    Schema { field: String, problem: String },

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Conflict (409) - e.g. recording already in progress
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Internal error (500)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_code) = match &self {
            Error::Configuration => (StatusCode::INTERNAL_SERVER_ERROR, "CONFIGURATION"),
            Error::Device(_) => (StatusCode::SERVICE_UNAVAILABLE, "DEVICE"),
            Error::Transcription(_) => (StatusCode::BAD_GATEWAY, "TRANSCRIPTION"),
            Error::Analysis(_) => (StatusCode::BAD_GATEWAY, "ANALYSIS"),
            Error::Parse { .. } => (StatusCode::BAD_GATEWAY, "PARSE"),
            Error::Schema { .. } => (StatusCode::BAD_GATEWAY, "SCHEMA"),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Error::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Error::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
