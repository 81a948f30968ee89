use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the capture state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapturePhase {
    Idle,
    Recording,
    Transcribing,
}

/// Point-in-time view of a feedback session.
///
/// This is what the presentation layer renders; it never exposes partial
/// pipeline state beyond these fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,

    /// Current capture phase
    pub phase: CapturePhase,

    /// Whether an analysis request is in flight
    pub analyzing: bool,

    /// Current feedback text (transcribed or typed)
    pub feedback_text: String,

    /// Whether the current text came from audio transcription
    pub from_audio: bool,

    /// Last user-facing error, if any
    pub last_error: Option<String>,

    /// When the session was created
    pub started_at: DateTime<Utc>,

    /// Seconds since session creation
    pub uptime_secs: f64,
}
