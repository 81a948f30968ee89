//! Analysis response contract
//!
//! The shared shape produced by the analysis client and consumed by the
//! rendering layer, plus the prompt-contract and response-validation layer
//! that guards the boundary to the model service.

mod contract;
mod result;

pub use contract::{
    build_analysis_prompt, parse_analysis_reply, strip_code_fence, TRANSCRIBE_INSTRUCTION,
};
pub use result::{AnalysisResult, Moderation, ModerationAction, Sentiment};
