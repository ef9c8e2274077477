//! Gemini `generateContent` client with retry.

use super::wire::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::RETRY_AFTER};
use sprout_config::GenerationSettings;
use sprout_error::{GenerationError, GenerationErrorKind, SproutResult};
use sprout_interface::ModelClient;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Environment variable holding the Gemini API key.
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Gemini REST client.
///
/// Transient failures (HTTP 408, 429 and 5xx, transport errors, empty
/// answers) are retried with exponential backoff and jitter. A
/// `Retry-After` header on the response overrides the computed delay.
///
/// # Example
///
/// ```no_run
/// use sprout_config::GenerationSettings;
/// use sprout_interface::ModelClient;
/// use sprout_models::GeminiClient;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClient::new(&GenerationSettings::default())?;
/// let text = client.generate("Suggest three counting games").await?;
/// println!("{text}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_retries: usize,
    retry_backoff_ms: u64,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a client reading the API key from `GEMINI_API_KEY`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is not set or the HTTP client cannot be
    /// built.
    #[instrument(skip_all)]
    pub fn new(settings: &GenerationSettings) -> SproutResult<Self> {
        let api_key = std::env::var(GEMINI_API_KEY_VAR).map_err(|e| {
            GenerationError::new(GenerationErrorKind::ClientConfiguration(format!(
                "{} not set: {}",
                GEMINI_API_KEY_VAR, e
            )))
        })?;
        Self::with_api_key(api_key, settings)
    }

    /// Create a client with an explicit API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is blank or the HTTP client cannot be
    /// built.
    #[instrument(skip_all, fields(model = %settings.model()))]
    pub fn with_api_key(
        api_key: impl Into<String>,
        settings: &GenerationSettings,
    ) -> SproutResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(GenerationError::new(GenerationErrorKind::ClientConfiguration(
                "Gemini API key is empty".to_string(),
            ))
            .into());
        }

        let client = Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| {
                GenerationError::new(GenerationErrorKind::ClientConfiguration(format!(
                    "Failed to build HTTP client: {}",
                    e
                )))
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: settings.model().clone(),
            max_retries: *settings.max_retries(),
            retry_backoff_ms: *settings.retry_backoff_ms(),
            timeout_secs: *settings.timeout_secs(),
        })
    }

    /// Point the client at a different API root.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }

    async fn generate_once(&self, prompt: &str) -> Result<String, RetryError<GenerationError>> {
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateContentRequest::user_text(prompt))
            .send()
            .await
            .map_err(|e| {
                let kind = if e.is_timeout() {
                    GenerationErrorKind::Timeout {
                        seconds: self.timeout_secs,
                    }
                } else {
                    GenerationErrorKind::ModelCall(format!("Request failed: {}", e))
                };
                classify(GenerationError::new(kind), None)
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = retry_after(&response, status);
            let message = response.text().await.unwrap_or_default();
            return Err(classify(
                GenerationError::new(GenerationErrorKind::Http {
                    status_code: status.as_u16(),
                    message,
                }),
                retry_after,
            ));
        }

        let body: GenerateContentResponse = response.json().await.map_err(|e| {
            classify(
                GenerationError::new(GenerationErrorKind::ModelCall(format!(
                    "Failed to parse response: {}",
                    e
                ))),
                None,
            )
        })?;

        match body.text() {
            Some(text) => Ok(text),
            None => {
                if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
                    warn!(block_reason = %reason, "Prompt was blocked by the provider");
                } else if let Some(reason) = body.candidates.first().and_then(|c| c.finish_reason.as_deref()) {
                    debug!(finish_reason = %reason, "Candidate carried no text");
                }
                Err(classify(
                    GenerationError::new(GenerationErrorKind::EmptyResponse),
                    None,
                ))
            }
        }
    }
}

fn classify(err: GenerationError, retry_after: Option<Duration>) -> RetryError<GenerationError> {
    if err.kind.is_retryable() {
        warn!(error = %err, "Gemini call failed, will retry");
        RetryError::Transient { err, retry_after }
    } else {
        warn!(error = %err, "Permanent Gemini error, failing immediately");
        RetryError::Permanent(err)
    }
}

fn retry_after(response: &reqwest::Response, status: StatusCode) -> Option<Duration> {
    if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
        return None;
    }
    let seconds: u64 = response
        .headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()?;
    Some(Duration::from_secs(seconds).min(MAX_RETRY_DELAY))
}

#[async_trait]
impl ModelClient for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> SproutResult<String> {
        // Delays are 2^n * factor, so halving the backoff yields
        // backoff, 2 * backoff, 4 * backoff, ...
        let strategy = ExponentialBackoff::from_millis(2)
            .factor((self.retry_backoff_ms / 2).max(1))
            .max_delay(MAX_RETRY_DELAY)
            .map(jitter)
            .take(self.max_retries);

        let text = Retry::spawn(strategy, || self.generate_once(prompt)).await?;
        debug!(response_len = text.len(), "Gemini response received");
        Ok(text)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
