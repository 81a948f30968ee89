// Tests for the Gemini client credential guard and configuration loading
//
// The credential check must run before any network attempt: with no key
// configured both operations fail immediately with a Configuration error,
// even when the endpoint is unreachable.

use feedback_analyzer::config::GeminiConfig;
use feedback_analyzer::{AudioPayload, Config, Error, GeminiClient};

fn client_without_key() -> GeminiClient {
    GeminiClient::new(&GeminiConfig {
        api_key: None,
        model: "gemini-2.5-flash-preview-04-17".to_string(),
        // Unroutable on purpose: a network attempt would fail differently.
        endpoint: "http://127.0.0.1:1".to_string(),
    })
}

#[tokio::test]
async fn test_transcribe_without_key_fails_fast() {
    let client = client_without_key();

    let payload = AudioPayload {
        bytes: vec![0u8; 16],
        mime_type: "audio/wav".to_string(),
    };

    let err = client
        .transcribe(&payload)
        .await
        .expect_err("missing key should be rejected");

    assert!(
        matches!(err, Error::Configuration),
        "Expected Configuration error, got {:?}",
        err
    );
}

#[tokio::test]
async fn test_analyze_without_key_fails_fast() {
    let client = client_without_key();

    let err = client
        .analyze("Some feedback")
        .await
        .expect_err("missing key should be rejected");

    assert!(matches!(err, Error::Configuration));
    assert!(err.to_string().contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn test_empty_key_is_treated_as_missing() {
    let client = GeminiClient::new(&GeminiConfig {
        api_key: Some(String::new()),
        model: "gemini-2.5-flash-preview-04-17".to_string(),
        endpoint: "http://127.0.0.1:1".to_string(),
    });

    let err = client
        .analyze("Some feedback")
        .await
        .expect_err("empty key should be rejected");

    assert!(matches!(err, Error::Configuration));
}

#[test]
fn test_config_defaults_without_file() {
    let cfg = Config::load("does/not/exist/feedback-analyzer")
        .expect("missing config file should fall back to defaults");

    assert_eq!(cfg.service.name, "feedback-analyzer");
    assert_eq!(cfg.service.http.bind, "127.0.0.1");
    assert_eq!(cfg.service.http.port, 8080);
    assert_eq!(cfg.audio.sample_rate, 16000);
    assert_eq!(cfg.audio.channels, 1);
    assert_eq!(cfg.gemini.model, "gemini-2.5-flash-preview-04-17");
    assert!(cfg
        .gemini
        .endpoint
        .starts_with("https://generativelanguage.googleapis.com"));
}
