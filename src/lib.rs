pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod gemini;
pub mod http;
pub mod session;

pub use analysis::{AnalysisResult, Moderation, ModerationAction, Sentiment};
pub use audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioPayload, AudioSource,
    FileBackend, PayloadRecorder,
};
pub use config::Config;
pub use error::{DeviceError, Error, Result};
pub use gemini::GeminiClient;
pub use http::{create_router, AppState};
pub use session::{
    Analyzer, CapturePhase, FeedbackSession, SessionConfig, SessionSnapshot, Transcriber,
};
