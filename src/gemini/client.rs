use base64::Engine;
use tracing::{debug, error, info, warn};

use super::messages::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
use crate::analysis::{self, AnalysisResult};
use crate::audio::AudioPayload;
use crate::config::GeminiConfig;
use crate::error::{Error, Result};
use crate::session::{Analyzer, Transcriber};

/// Substring the provider puts in error bodies when the credential is bad
const INVALID_KEY_MARKER: &str = "API key not valid";

/// Which pipeline operation a request belongs to, for error wrapping
#[derive(Debug, Clone, Copy)]
enum RequestKind {
    Transcription,
    Analysis,
}

impl RequestKind {
    fn wrap(self, message: String) -> Error {
        match self {
            RequestKind::Transcription => Error::Transcription(message),
            RequestKind::Analysis => Error::Analysis(message),
        }
    }
}

/// Client for the Gemini `generateContent` endpoint.
///
/// One request per user action, no retries: recovery is always
/// user-initiated (re-record, re-type, re-trigger analysis).
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    model: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// The configured credential, or a `Configuration` error.
    ///
    /// Checked before any network attempt so a missing key fails fast.
    fn api_key(&self) -> Result<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.is_empty() => Ok(key),
            _ => Err(Error::Configuration),
        }
    }

    /// Issue one generateContent request and return the reply text.
    async fn generate(&self, request: &GenerateContentRequest, kind: RequestKind) -> Result<String> {
        let key = self.api_key()?;
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.endpoint, self.model, key
        );

        debug!(model = %self.model, "Sending generateContent request");

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| kind.wrap(format!("request failed: {e}")))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();

            if body.contains(INVALID_KEY_MARKER) {
                warn!("Gemini rejected the API key");
                return Err(kind.wrap(
                    "Invalid API key. Please check your GEMINI_API_KEY environment variable."
                        .to_string(),
                ));
            }

            error!("Gemini API error {}: {}", status, body);
            return Err(kind.wrap(format!("Gemini API error {status}: {body}")));
        }

        let reply: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| kind.wrap(format!("invalid response body: {e}")))?;

        reply
            .text()
            .ok_or_else(|| kind.wrap("service returned an empty reply".to_string()))
    }

    /// Transcribe one audio payload to plain text.
    ///
    /// The trimmed reply is returned verbatim; transcription output is
    /// unstructured prose, not schema-bound.
    pub async fn transcribe(&self, payload: &AudioPayload) -> Result<String> {
        info!(
            bytes = payload.bytes.len(),
            mime = %payload.mime_type,
            "Transcribing audio payload"
        );

        let encoded = base64::engine::general_purpose::STANDARD.encode(&payload.bytes);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::inline_data(payload.mime_type.clone(), encoded),
                    Part::text(analysis::TRANSCRIBE_INSTRUCTION),
                ],
            }],
            generation_config: None,
        };

        let text = self.generate(&request, RequestKind::Transcription).await?;

        Ok(text.trim().to_string())
    }

    /// Analyze feedback text into a validated [`AnalysisResult`].
    pub async fn analyze(&self, feedback_text: &str) -> Result<AnalysisResult> {
        info!(chars = feedback_text.len(), "Analyzing feedback text");

        let prompt = analysis::build_analysis_prompt(feedback_text);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text(prompt)],
            }],
            // Structured extraction: JSON mode at low sampling temperature
            // to reduce schema drift.
            generation_config: Some(GenerationConfig {
                temperature: 0.2,
                response_mime_type: Some("application/json".to_string()),
            }),
        };

        let raw = self.generate(&request, RequestKind::Analysis).await?;

        analysis::parse_analysis_reply(&raw)
    }
}

#[async_trait::async_trait]
impl Transcriber for GeminiClient {
    async fn transcribe(&self, payload: &AudioPayload) -> Result<String> {
        GeminiClient::transcribe(self, payload).await
    }
}

#[async_trait::async_trait]
impl Analyzer for GeminiClient {
    async fn analyze(&self, feedback_text: &str) -> Result<AnalysisResult> {
        GeminiClient::analyze(self, feedback_text).await
    }
}
