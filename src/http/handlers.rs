use super::state::AppState;
use crate::analysis::AnalysisResult;
use crate::error::Result;
use crate::session::SessionSnapshot;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopRecordingResponse {
    pub session_id: String,
    pub status: String,
    /// Transcript of the recorded audio
    pub transcript: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTextRequest {
    pub text: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /feedback/record/start
/// Start recording feedback audio
pub async fn start_recording(
    State(state): State<AppState>,
) -> Result<Json<StartRecordingResponse>> {
    state.session.start_recording().await?;

    Ok(Json(StartRecordingResponse {
        session_id: state.session.session_id().to_string(),
        status: "recording".to_string(),
        message: "Recording started".to_string(),
    }))
}

/// POST /feedback/record/stop
/// Stop recording, transcribe the captured audio, and return the transcript
pub async fn stop_recording(State(state): State<AppState>) -> Result<Json<StopRecordingResponse>> {
    let transcript = state.session.stop_recording().await?;

    Ok(Json(StopRecordingResponse {
        session_id: state.session.session_id().to_string(),
        status: "idle".to_string(),
        transcript,
    }))
}

/// GET /feedback/session
/// Get the current session snapshot for the presentation layer
pub async fn get_session(State(state): State<AppState>) -> Json<SessionSnapshot> {
    Json(state.session.snapshot().await)
}

/// PUT /feedback/text
/// Replace the feedback text (manual typing or edits)
pub async fn update_text(
    State(state): State<AppState>,
    Json(req): Json<UpdateTextRequest>,
) -> Json<SessionSnapshot> {
    state.session.set_feedback_text(req.text).await;

    Json(state.session.snapshot().await)
}

/// POST /feedback/analyze
/// Analyze the current feedback text and return the validated result
pub async fn analyze(State(state): State<AppState>) -> Result<Json<AnalysisResult>> {
    info!("Analysis requested");

    let result = state.session.analyze().await?;

    Ok(Json(result))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
