pub mod backend;
pub mod capture;
pub mod file;

#[cfg(feature = "microphone")]
pub mod microphone;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioSource};
pub use capture::{AudioPayload, PayloadRecorder};
pub use file::FileBackend;
