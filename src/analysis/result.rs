use serde::{Deserialize, Serialize};

/// Overall sentiment classification returned by the model.
///
/// Values outside the nominal enumeration are carried through as `Other`
/// rather than rejected, so model output drift degrades gracefully instead
/// of hard-failing on a cosmetic mismatch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
    Mixed,
    Other(String),
}

impl Sentiment {
    pub fn as_str(&self) -> &str {
        match self {
            Sentiment::Positive => "Positive",
            Sentiment::Negative => "Negative",
            Sentiment::Neutral => "Neutral",
            Sentiment::Mixed => "Mixed",
            Sentiment::Other(value) => value,
        }
    }
}

impl From<String> for Sentiment {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Positive" => Sentiment::Positive,
            "Negative" => Sentiment::Negative,
            "Neutral" => Sentiment::Neutral,
            "Mixed" => Sentiment::Mixed,
            _ => Sentiment::Other(value),
        }
    }
}

impl From<Sentiment> for String {
    fn from(value: Sentiment) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for Sentiment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Suggested disposition for a piece of feedback, as judged by the model.
///
/// Unknown values are tolerated the same way as [`Sentiment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModerationAction {
    Allow,
    Block,
    RequestRephrasing,
    Other(String),
}

impl ModerationAction {
    pub fn as_str(&self) -> &str {
        match self {
            ModerationAction::Allow => "Allow",
            ModerationAction::Block => "Block",
            ModerationAction::RequestRephrasing => "Request Rephrasing",
            ModerationAction::Other(value) => value,
        }
    }
}

impl From<String> for ModerationAction {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Allow" => ModerationAction::Allow,
            "Block" => ModerationAction::Block,
            "Request Rephrasing" => ModerationAction::RequestRephrasing,
            _ => ModerationAction::Other(value),
        }
    }
}

impl From<ModerationAction> for String {
    fn from(value: ModerationAction) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ModerationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Moderation verdict for a piece of feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Moderation {
    pub action: ModerationAction,
    /// Brief explanation for the action
    pub reason: String,
}

/// Validated analysis of one piece of feedback.
///
/// Immutable once constructed: an instance only exists after every field
/// passed shape validation, so consumers never see a partially-valid state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub sentiment: Sentiment,
    /// Emotional intensity in [0.0, 1.0] (producer-trusted range)
    pub intensity: f64,
    /// Concise summary of the main points
    pub summary: String,
    pub moderation: Moderation,
    /// Suggested follow-up for HR
    pub actionable_insight: String,
}
