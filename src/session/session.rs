use super::config::SessionConfig;
use super::snapshot::{CapturePhase, SessionSnapshot};
use crate::analysis::AnalysisResult;
use crate::audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioPayload, PayloadRecorder,
};
use crate::error::{Error, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Boundary to the transcription capability of the model service
#[async_trait::async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, payload: &AudioPayload) -> Result<String>;
}

/// Boundary to the analysis capability of the model service
#[async_trait::async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, feedback_text: &str) -> Result<AnalysisResult>;
}

/// The live backend plus the task collecting its frames
struct ActiveRecording {
    backend: Box<dyn AudioBackend>,
    collector: JoinHandle<Result<AudioPayload>>,
}

/// Capture phase and backend ownership, guarded together so they can
/// never diverge.
struct CaptureState {
    phase: CapturePhase,
    recording: Option<ActiveRecording>,
}

/// Session-level text state
struct TextState {
    feedback_text: String,
    from_audio: bool,
    last_error: Option<String>,
}

/// A feedback session: one user interaction owning the capture state
/// machine, the current feedback text, and the busy flag guarding the
/// analyze action.
///
/// The state machine runs `Idle -> Recording -> Transcribing -> Idle`;
/// device failures surface as errors while the phase returns to `Idle`,
/// since retry by re-recording is always possible.
pub struct FeedbackSession {
    config: SessionConfig,
    transcriber: Arc<dyn Transcriber>,
    analyzer: Arc<dyn Analyzer>,
    started_at: chrono::DateTime<Utc>,

    state: Mutex<CaptureState>,
    text: Mutex<TextState>,

    /// Whether an analysis request is in flight
    analyzing: AtomicBool,
}

impl FeedbackSession {
    pub fn new(
        config: SessionConfig,
        transcriber: Arc<dyn Transcriber>,
        analyzer: Arc<dyn Analyzer>,
    ) -> Self {
        info!("Creating feedback session: {}", config.session_id);

        Self {
            config,
            transcriber,
            analyzer,
            started_at: Utc::now(),
            state: Mutex::new(CaptureState {
                phase: CapturePhase::Idle,
                recording: None,
            }),
            text: Mutex::new(TextState {
                feedback_text: String::new(),
                from_audio: false,
                last_error: None,
            }),
            analyzing: AtomicBool::new(false),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Start a new recording.
    ///
    /// Rejected unless the session is idle and no analysis is in flight.
    /// Clears the previous feedback text before capture begins.
    pub async fn start_recording(&self) -> Result<()> {
        let mut state = self.state.lock().await;

        if state.phase != CapturePhase::Idle {
            warn!("Recording start rejected: session is {:?}", state.phase);
            return Err(Error::Conflict(
                "a recording or transcription is already in progress".to_string(),
            ));
        }

        if self.analyzing.load(Ordering::SeqCst) {
            warn!("Recording start rejected: analysis in flight");
            return Err(Error::Conflict("an analysis is in progress".to_string()));
        }

        info!("Starting recording for session: {}", self.config.session_id);

        {
            let mut text = self.text.lock().await;
            text.feedback_text.clear();
            text.from_audio = false;
            text.last_error = None;
        }

        let backend_config = AudioBackendConfig {
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
            ..AudioBackendConfig::default()
        };

        let mut backend =
            match AudioBackendFactory::create(self.config.source.clone(), backend_config) {
                Ok(backend) => backend,
                Err(e) => {
                    error!("Failed to create audio backend: {}", e);
                    self.record_error(&e).await;
                    return Err(e);
                }
            };

        let audio_rx = match backend.start().await {
            Ok(rx) => rx,
            Err(e) => {
                error!("Failed to start audio capture: {}", e);
                self.record_error(&e).await;
                return Err(e);
            }
        };

        let backend_name = backend.name().to_string();

        let recorder = PayloadRecorder::new(self.config.sample_rate, self.config.channels);
        let collector = tokio::spawn(recorder.record(audio_rx));

        state.phase = CapturePhase::Recording;
        state.recording = Some(ActiveRecording { backend, collector });

        info!("Recording started (backend: {})", backend_name);

        Ok(())
    }

    /// Stop the active recording, transcribe the captured payload, and
    /// store the transcript as the session's feedback text.
    ///
    /// The device is released on every exit path before transcription is
    /// attempted. Transcription failure returns the session to `Idle`,
    /// not a terminal error state, since re-recording is always possible.
    pub async fn stop_recording(&self) -> Result<String> {
        let mut state = self.state.lock().await;

        if state.phase != CapturePhase::Recording {
            warn!("Recording stop rejected: session is {:?}", state.phase);
            return Err(Error::Conflict("no recording is in progress".to_string()));
        }

        info!("Stopping recording for session: {}", self.config.session_id);

        let Some(ActiveRecording {
            mut backend,
            collector,
        }) = state.recording.take()
        else {
            state.phase = CapturePhase::Idle;
            return Err(Error::Internal("recording state lost".to_string()));
        };

        // Release the device first; this also closes the frame channel so
        // the collector can finalize the payload.
        if let Err(e) = backend.stop().await {
            error!("Failed to stop audio backend: {}", e);
        }

        state.phase = CapturePhase::Transcribing;
        drop(state);

        let payload = match collector.await {
            Ok(Ok(payload)) => payload,
            Ok(Err(e)) => return self.fail_transcription(e).await,
            Err(e) => {
                return self
                    .fail_transcription(Error::Internal(format!(
                        "audio collector task failed: {e}"
                    )))
                    .await
            }
        };

        info!(
            "Payload finalized: {} bytes ({})",
            payload.bytes.len(),
            payload.mime_type
        );

        match self.transcriber.transcribe(&payload).await {
            Ok(transcript) => {
                {
                    let mut state = self.state.lock().await;
                    state.phase = CapturePhase::Idle;
                }

                let mut text = self.text.lock().await;
                text.feedback_text = transcript.clone();
                text.from_audio = !transcript.is_empty();
                text.last_error = None;

                info!("Transcription complete ({} chars)", transcript.len());
                Ok(transcript)
            }
            Err(e) => self.fail_transcription(e).await,
        }
    }

    /// Replace the feedback text (manual typing or edits).
    ///
    /// Editing cancels the from-audio hint and any stale transcription
    /// error; the capture state machine itself is untouched.
    pub async fn set_feedback_text(&self, new_text: String) {
        let mut text = self.text.lock().await;
        text.feedback_text = new_text;
        text.from_audio = false;
        text.last_error = None;
    }

    /// Analyze the current feedback text.
    ///
    /// One analysis at a time; concurrent attempts are rejected. A failed
    /// analysis leaves the feedback text intact and editable.
    pub async fn analyze(&self) -> Result<AnalysisResult> {
        {
            let state = self.state.lock().await;
            if state.phase != CapturePhase::Idle {
                warn!("Analysis rejected: session is {:?}", state.phase);
                return Err(Error::Conflict(
                    "a recording or transcription is in progress".to_string(),
                ));
            }
        }

        if self
            .analyzing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Analysis rejected: another analysis is in flight");
            return Err(Error::Conflict(
                "an analysis is already in progress".to_string(),
            ));
        }

        let feedback_text = {
            let mut text = self.text.lock().await;

            if text.feedback_text.trim().is_empty() {
                self.analyzing.store(false, Ordering::SeqCst);
                return Err(Error::BadRequest(
                    "Please record or provide some feedback to analyze.".to_string(),
                ));
            }

            text.last_error = None;
            text.feedback_text.clone()
        };

        let result = self.analyzer.analyze(&feedback_text).await;
        self.analyzing.store(false, Ordering::SeqCst);

        match result {
            Ok(analysis) => {
                info!(sentiment = %analysis.sentiment, "Analysis complete");
                Ok(analysis)
            }
            Err(e) => {
                error!("Analysis failed: {}", e);
                self.record_error(&e).await;
                Err(e)
            }
        }
    }

    /// Get a point-in-time view of the session
    pub async fn snapshot(&self) -> SessionSnapshot {
        let phase = {
            let state = self.state.lock().await;
            state.phase
        };

        let text = self.text.lock().await;
        let uptime = Utc::now().signed_duration_since(self.started_at);

        SessionSnapshot {
            session_id: self.config.session_id.clone(),
            phase,
            analyzing: self.analyzing.load(Ordering::SeqCst),
            feedback_text: text.feedback_text.clone(),
            from_audio: text.from_audio,
            last_error: text.last_error.clone(),
            started_at: self.started_at,
            uptime_secs: uptime.num_milliseconds() as f64 / 1000.0,
        }
    }

    /// Release any live capture.
    ///
    /// Called on service teardown so a recording in progress never leaks
    /// an open device handle.
    pub async fn shutdown(&self) {
        let mut state = self.state.lock().await;

        if let Some(ActiveRecording {
            mut backend,
            collector,
        }) = state.recording.take()
        {
            warn!("Session shut down while recording; releasing device");

            if let Err(e) = backend.stop().await {
                error!("Failed to stop audio backend: {}", e);
            }

            collector.abort();
        }

        state.phase = CapturePhase::Idle;
    }

    /// Discard the payload and return to `Idle` with the failure recorded.
    ///
    /// Only the audio-derived transcript is cleared; the text was already
    /// emptied when this recording started.
    async fn fail_transcription(&self, err: Error) -> Result<String> {
        error!("Transcription failed: {}", err);

        {
            let mut state = self.state.lock().await;
            state.phase = CapturePhase::Idle;
        }

        let mut text = self.text.lock().await;
        text.feedback_text.clear();
        text.from_audio = false;
        text.last_error = Some(err.to_string());

        Err(err)
    }

    async fn record_error(&self, err: &Error) {
        let mut text = self.text.lock().await;
        text.last_error = Some(err.to_string());
    }
}
