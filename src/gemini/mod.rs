//! Client for the remote Gemini model service
//!
//! One request type for multimodal transcription (inline audio bytes plus
//! instruction text) and one for schema-constrained feedback analysis.

pub mod client;
pub mod messages;

pub use client::GeminiClient;
pub use messages::{GenerateContentRequest, GenerateContentResponse};
