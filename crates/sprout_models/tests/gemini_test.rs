//! Gemini client tests against a mock HTTP server.

use serde_json::json;
use sprout_config::GenerationSettings;
use sprout_error::{GenerationErrorKind, SproutError, SproutErrorKind};
use sprout_interface::ModelClient;
use sprout_models::GeminiClient;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ENDPOINT: &str = "/v1beta/models/gemini-2.0-flash:generateContent";

fn client(server: &MockServer, max_retries: usize) -> anyhow::Result<GeminiClient> {
    let settings = GenerationSettings::default()
        .with_max_retries(max_retries)
        .with_retry_backoff_ms(2)
        .with_timeout_secs(5);
    Ok(GeminiClient::with_api_key("test-key", &settings)?
        .with_base_url(format!("{}/v1beta", server.uri())))
}

fn text_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    }))
}

fn generation_kind(err: &SproutError) -> &GenerationErrorKind {
    match err.kind() {
        SproutErrorKind::Generation(e) => &e.kind,
        other => panic!("expected a generation error, got {other}"),
    }
}

#[tokio::test]
async fn test_generate_returns_candidate_text() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(text_response(r#"{"title":"Counting"}"#))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server, 3)?;
    assert_eq!(client.generate("plan please").await?, r#"{"title":"Counting"}"#);
    assert_eq!(client.provider_name(), "gemini");
    assert_eq!(client.model_name(), "gemini-2.0-flash");
    Ok(())
}

#[tokio::test]
async fn test_transient_errors_are_retried() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(text_response("ok"))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client(&server, 3)?.generate("prompt").await?, "ok");
    Ok(())
}

#[tokio::test]
async fn test_permanent_errors_fail_immediately() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 3)?.generate("prompt").await.unwrap_err();
    assert_eq!(
        generation_kind(&err),
        &GenerationErrorKind::Http {
            status_code: 400,
            message: "bad request".to_string()
        }
    );
    assert!(!err.is_retryable());
    Ok(())
}

#[tokio::test]
async fn test_retries_are_bounded() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(429))
        .expect(3)
        .mount(&server)
        .await;

    let err = client(&server, 2)?.generate("prompt").await.unwrap_err();
    assert!(matches!(
        generation_kind(&err),
        GenerationErrorKind::Http { status_code: 429, .. }
    ));
    assert!(err.is_retryable());
    Ok(())
}

#[tokio::test]
async fn test_empty_candidates_are_an_error() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [],
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&server)
        .await;

    let err = client(&server, 0)?.generate("prompt").await.unwrap_err();
    assert_eq!(generation_kind(&err), &GenerationErrorKind::EmptyResponse);
    Ok(())
}
