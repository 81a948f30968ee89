//! Prompt contract and response validation.
//!
//! The prompt template is the load-bearing contract with the model: it is
//! the only mechanism ensuring a parseable reply. Its wording is preserved
//! byte-for-byte from the deployed original; rewording risks silently
//! degraded compliance.

use serde_json::Value;

use super::result::{AnalysisResult, Moderation, ModerationAction, Sentiment};
use crate::error::{Error, Result};

/// Fixed instruction sent with every transcription request.
pub const TRANSCRIBE_INSTRUCTION: &str = "Transcribe the following audio recording accurately. Return only the transcribed text, with no additional commentary or formatting.";

/// Maximum characters of raw model text carried in a parse error
const RAW_EXCERPT_MAX: usize = 100;

const ANALYSIS_PROMPT_PREFIX: &str = r#"
You are an expert AI assistant specialized in analyzing employee feedback.
Your task is to process the provided employee feedback text (which may have been transcribed from audio) and return a JSON object with the following exact structure and data types:

{
  "sentiment": "string (Enum: Positive, Negative, Neutral, or Mixed)",
  "intensity": "number (Float between 0.0 for no emotion and 1.0 for very strong emotion)",
  "summary": "string (A concise one or two sentence summary of the main points in the feedback)",
  "moderation": {
    "action": "string (Enum: Allow, Block, or Request Rephrasing)",
    "reason": "string (A brief explanation for the moderation action. If 'Allow', state why it's acceptable.)"
  },
  "actionable_insight": "string (A specific, actionable suggestion or follow-up for HR based on the feedback. Be constructive.)"
}

Ensure the 'intensity' is a numerical value.
Ensure the 'summary' is brief and captures the essence.
For 'moderation.action', strictly use one of the three enum values.
For 'moderation.reason', be concise.
For 'actionable_insight', provide a concrete step HR can consider.

Analyze the following employee feedback text:
```
"#;

const ANALYSIS_PROMPT_SUFFIX: &str = r#"
```

Respond ONLY with the JSON object described above. Do not include any markdown formatting like ```json or any other text or explanations outside the JSON structure itself.
The entire response should be a single, valid JSON object.
"#;

/// Build the analysis prompt with the feedback text embedded verbatim.
pub fn build_analysis_prompt(feedback_text: &str) -> String {
    format!("{ANALYSIS_PROMPT_PREFIX}{feedback_text}{ANALYSIS_PROMPT_SUFFIX}")
}

/// Strip one optional leading/trailing Markdown code fence (with optional
/// language tag) from a model reply.
///
/// Some models wrap JSON replies in triple-backtick fences despite
/// instructions. Both fences must be present for anything to be stripped;
/// otherwise the trimmed input is returned unchanged.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };

    // Drop the optional language tag on the opening fence.
    let body = body.trim_start_matches(|c: char| c.is_ascii_alphanumeric());

    body.trim()
}

/// Parse and shape-validate a raw model reply.
///
/// This is the single point where model output crosses the trust boundary:
/// the reply either yields a fully valid [`AnalysisResult`] or a `Parse` /
/// `Schema` error. No coercion or best-effort repair is attempted.
pub fn parse_analysis_reply(raw: &str) -> Result<AnalysisResult> {
    let json = strip_code_fence(raw);

    let value: Value = serde_json::from_str(json).map_err(|_| Error::Parse {
        excerpt: raw_excerpt(raw),
    })?;

    validate_shape(&value)
}

/// Check every contract field for presence and JSON primitive type.
///
/// Enum membership and the numeric range of `intensity` are deliberately
/// not enforced; see the response types for how unknown values are carried.
fn validate_shape(value: &Value) -> Result<AnalysisResult> {
    let root = match value.as_object() {
        Some(map) => map,
        None => return Err(schema_error("reply", "is not a JSON object")),
    };

    let sentiment = require_string(root, "sentiment", "sentiment")?;
    let intensity = require_number(root, "intensity", "intensity")?;
    let summary = require_string(root, "summary", "summary")?;

    let moderation = match root.get("moderation") {
        Some(Value::Object(map)) => map,
        Some(_) => return Err(schema_error("moderation", "has the wrong type, expected an object")),
        None => return Err(schema_error("moderation", "is missing")),
    };

    let action = require_string(moderation, "action", "moderation.action")?;
    let reason = require_string(moderation, "reason", "moderation.reason")?;

    let actionable_insight = require_string(root, "actionable_insight", "actionable_insight")?;

    Ok(AnalysisResult {
        sentiment: Sentiment::from(sentiment),
        intensity,
        summary,
        moderation: Moderation {
            action: ModerationAction::from(action),
            reason,
        },
        actionable_insight,
    })
}

fn require_string(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    field: &str,
) -> Result<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(schema_error(field, "has the wrong type, expected a string")),
        None => Err(schema_error(field, "is missing")),
    }
}

fn require_number(obj: &serde_json::Map<String, Value>, key: &str, field: &str) -> Result<f64> {
    match obj.get(key) {
        Some(Value::Number(n)) => n
            .as_f64()
            .ok_or_else(|| schema_error(field, "is not a representable number")),
        Some(_) => Err(schema_error(field, "has the wrong type, expected a number")),
        None => Err(schema_error(field, "is missing")),
    }
}

fn schema_error(field: &str, problem: &str) -> Error {
    Error::Schema {
        field: field.to_string(),
        problem: problem.to_string(),
    }
}

/// Char-boundary-safe prefix of the raw reply, for error diagnostics.
fn raw_excerpt(raw: &str) -> String {
    let mut end = RAW_EXCERPT_MAX.min(raw.len());
    while !raw.is_char_boundary(end) {
        end -= 1;
    }
    raw[..end].to_string()
}
