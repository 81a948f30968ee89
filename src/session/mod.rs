//! Feedback session management
//!
//! This module provides the `FeedbackSession` abstraction that manages:
//! - The capture state machine (idle/recording/transcribing)
//! - Assembly of captured audio into a transferable payload
//! - Transcription and analysis through the model-service boundary traits
//! - Session text state (transcript, from-audio hint, last error)

mod config;
mod session;
mod snapshot;

pub use config::SessionConfig;
pub use session::{Analyzer, FeedbackSession, Transcriber};
pub use snapshot::{CapturePhase, SessionSnapshot};
