// Unit tests for the analysis prompt contract and response validation
//
// These tests verify that model replies either yield a fully-typed
// AnalysisResult or a distinguishable Parse/Schema error, including the
// de-fencing of replies wrapped in Markdown code fences.

use feedback_analyzer::analysis::{
    build_analysis_prompt, parse_analysis_reply, strip_code_fence,
};
use feedback_analyzer::{Error, ModerationAction, Sentiment};

const VALID_REPLY: &str = r#"{"sentiment":"Negative","intensity":0.8,"summary":"Employee finds new policy confusing and stressful.","moderation":{"action":"Allow","reason":"Constructive criticism, not offensive."},"actionable_insight":"Schedule a clarifying session on the new policy."}"#;

#[test]
fn test_valid_reply_returns_typed_result() {
    let result = parse_analysis_reply(VALID_REPLY).expect("valid reply should parse");

    assert_eq!(result.sentiment, Sentiment::Negative);
    assert_eq!(result.intensity, 0.8);
    assert_eq!(
        result.summary,
        "Employee finds new policy confusing and stressful."
    );
    assert_eq!(result.moderation.action, ModerationAction::Allow);
    assert_eq!(
        result.moderation.reason,
        "Constructive criticism, not offensive."
    );
    assert_eq!(
        result.actionable_insight,
        "Schedule a clarifying session on the new policy."
    );
}

#[test]
fn test_valid_reply_round_trips_unchanged() {
    // The validated result must serialize back to exactly the object the
    // model returned, including the wire strings of the enums.
    let result = parse_analysis_reply(VALID_REPLY).expect("valid reply should parse");

    let reserialized = serde_json::to_value(&result).expect("result should serialize");
    let original: serde_json::Value =
        serde_json::from_str(VALID_REPLY).expect("fixture should be valid JSON");

    assert_eq!(reserialized, original);
}

#[test]
fn test_fenced_reply_parses_identically() {
    let fenced = format!("```json\n{VALID_REPLY}\n```");

    let from_fenced = parse_analysis_reply(&fenced).expect("fenced reply should parse");
    let from_plain = parse_analysis_reply(VALID_REPLY).expect("plain reply should parse");

    assert_eq!(from_fenced, from_plain);
}

#[test]
fn test_fence_without_language_tag() {
    let fenced = format!("```\n{VALID_REPLY}\n```");

    let result = parse_analysis_reply(&fenced).expect("fenced reply should parse");
    assert_eq!(result.sentiment, Sentiment::Negative);
}

#[test]
fn test_fence_with_surrounding_whitespace() {
    let fenced = format!("\n  ```json\n{VALID_REPLY}\n```  \n");

    let result = parse_analysis_reply(&fenced).expect("fenced reply should parse");
    assert_eq!(result.moderation.action, ModerationAction::Allow);
}

#[test]
fn test_strip_code_fence_requires_both_fences() {
    // A lone opening fence is not stripped; the reply is passed through
    // (and will fail to parse as JSON downstream).
    let partial = "```json\n{\"sentiment\":\"Neutral\"}";
    assert_eq!(strip_code_fence(partial), partial.trim());

    let unfenced = "{\"sentiment\":\"Neutral\"}";
    assert_eq!(strip_code_fence(unfenced), unfenced);
}

#[test]
fn test_non_json_reply_is_parse_error() {
    let err = parse_analysis_reply("I'm sorry, I can't help with that.")
        .expect_err("prose should not parse");

    match err {
        Error::Parse { excerpt } => {
            assert!(excerpt.starts_with("I'm sorry"));
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_parse_error_excerpt_is_bounded() {
    let long_reply = "not json ".repeat(200);

    let err = parse_analysis_reply(&long_reply).expect_err("should not parse");

    match err {
        Error::Parse { excerpt } => {
            assert!(excerpt.len() <= 100, "excerpt should be bounded to 100 chars");
            assert!(long_reply.starts_with(&excerpt));
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_parse_error_excerpt_respects_char_boundaries() {
    // Multi-byte characters around the excerpt cutoff must not panic.
    let long_reply = "あ".repeat(120);

    let err = parse_analysis_reply(&long_reply).expect_err("should not parse");

    match err {
        Error::Parse { excerpt } => {
            assert!(excerpt.len() <= 100);
            assert!(long_reply.starts_with(&excerpt));
        }
        other => panic!("Expected Parse error, got {:?}", other),
    }
}

#[test]
fn test_missing_field_is_schema_error() {
    let reply = r#"{"sentiment":"Positive","intensity":0.4,"summary":"Fine.","moderation":{"action":"Allow","reason":"ok"}}"#;

    let err = parse_analysis_reply(reply).expect_err("missing field should be rejected");

    match err {
        Error::Schema { field, .. } => assert_eq!(field, "actionable_insight"),
        other => panic!("Expected Schema error, got {:?}", other),
    }
}

#[test]
fn test_intensity_as_string_is_schema_error() {
    // Wrong primitive type, never silently coerced.
    let reply = r#"{"sentiment":"Negative","intensity":"high","summary":"Bad.","moderation":{"action":"Allow","reason":"ok"},"actionable_insight":"Follow up."}"#;

    let err = parse_analysis_reply(reply).expect_err("mistyped field should be rejected");

    match err {
        Error::Schema { field, .. } => assert_eq!(field, "intensity"),
        other => panic!("Expected Schema error, got {:?}", other),
    }
}

#[test]
fn test_moderation_as_string_is_schema_error() {
    let reply = r#"{"sentiment":"Negative","intensity":0.5,"summary":"Bad.","moderation":"Allow","actionable_insight":"Follow up."}"#;

    let err = parse_analysis_reply(reply).expect_err("mistyped moderation should be rejected");

    match err {
        Error::Schema { field, .. } => assert_eq!(field, "moderation"),
        other => panic!("Expected Schema error, got {:?}", other),
    }
}

#[test]
fn test_missing_moderation_reason_is_schema_error() {
    let reply = r#"{"sentiment":"Negative","intensity":0.5,"summary":"Bad.","moderation":{"action":"Allow"},"actionable_insight":"Follow up."}"#;

    let err = parse_analysis_reply(reply).expect_err("missing nested field should be rejected");

    match err {
        Error::Schema { field, .. } => assert_eq!(field, "moderation.reason"),
        other => panic!("Expected Schema error, got {:?}", other),
    }
}

#[test]
fn test_non_object_reply_is_schema_error() {
    let err = parse_analysis_reply("[1, 2, 3]").expect_err("array should be rejected");

    assert!(matches!(err, Error::Schema { .. }));
}

#[test]
fn test_unknown_enum_values_are_tolerated() {
    // Out-of-enumeration values keep the correct shape and survive as
    // opaque strings rather than failing validation.
    let reply = r#"{"sentiment":"Ambivalent","intensity":0.5,"summary":"Hard to say.","moderation":{"action":"Escalate","reason":"unusual"},"actionable_insight":"Review manually."}"#;

    let result = parse_analysis_reply(reply).expect("unknown enum values should pass");

    assert_eq!(result.sentiment, Sentiment::Other("Ambivalent".to_string()));
    assert_eq!(
        result.moderation.action,
        ModerationAction::Other("Escalate".to_string())
    );
    assert_eq!(result.sentiment.as_str(), "Ambivalent");
}

#[test]
fn test_moderation_action_wire_strings() {
    assert_eq!(ModerationAction::RequestRephrasing.as_str(), "Request Rephrasing");
    assert_eq!(
        ModerationAction::from("Request Rephrasing".to_string()),
        ModerationAction::RequestRephrasing
    );
}

#[test]
fn test_prompt_embeds_feedback_verbatim() {
    let feedback = "The new policy is confusing and stressful";
    let prompt = build_analysis_prompt(feedback);

    assert!(prompt.contains(feedback));
    assert!(prompt.contains("You are an expert AI assistant specialized in analyzing employee feedback."));
    assert!(prompt.contains("Respond ONLY with the JSON object described above."));
    assert!(prompt.contains("\"actionable_insight\""));
}

#[test]
fn test_prompt_names_every_contract_field() {
    let prompt = build_analysis_prompt("x");

    for field in ["sentiment", "intensity", "summary", "moderation", "action", "reason", "actionable_insight"] {
        assert!(
            prompt.contains(&format!("\"{field}\"")),
            "prompt should name field {field}"
        );
    }
}
