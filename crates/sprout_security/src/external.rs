//! External safety service layer.

use crate::{LayerOutcome, SafetyLayer};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use sprout_config::SafetySettings;
use sprout_core::SafetyVerdict;
use sprout_error::{SafetyError, SafetyErrorKind, SproutResult};
use std::time::Duration;
use tracing::{debug, instrument, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScreeningRequest<'a> {
    text: &'a str,
    child_age: u8,
}

/// Second classifier layer: asks a remote safety service for a verdict.
///
/// Every failure (timeout, network error, non-2xx status, undecodable body)
/// is logged and answered with [`LayerOutcome::Continue`], so an outage never
/// blocks generation.
#[derive(Debug, Clone)]
pub struct ExternalSafetyLayer {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl ExternalSafetyLayer {
    /// Layer posting to `endpoint` with `api_key` as bearer token.
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            timeout,
        }
    }

    /// Layer from settings, or `None` when the endpoint or key is missing.
    pub fn from_settings(settings: &SafetySettings) -> Option<Self> {
        let (endpoint, api_key) = settings.external_endpoint()?;
        Some(Self::new(endpoint, api_key, settings.timeout()))
    }

    /// Service endpoint.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, text: &str, child_age: u8) -> Result<SafetyVerdict, SafetyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&ScreeningRequest { text, child_age })
            .send()
            .await
            .map_err(|e| {
                SafetyError::new(SafetyErrorKind::ExternalService(format!(
                    "Request failed: {}",
                    e
                )))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SafetyError::new(SafetyErrorKind::ExternalService(format!(
                "Service returned status {}",
                status.as_u16()
            ))));
        }

        response.json::<SafetyVerdict>().await.map_err(|e| {
            SafetyError::new(SafetyErrorKind::ExternalService(format!(
                "Failed to decode verdict: {}",
                e
            )))
        })
    }
}

#[async_trait]
impl SafetyLayer for ExternalSafetyLayer {
    fn name(&self) -> &'static str {
        "external"
    }

    #[instrument(skip(self, text), fields(endpoint = %self.endpoint, text_len = text.len()))]
    async fn evaluate(&self, text: &str, child_age: u8) -> SproutResult<LayerOutcome> {
        match tokio::time::timeout(self.timeout, self.request(text, child_age)).await {
            Ok(Ok(verdict)) => {
                debug!(
                    is_appropriate = verdict.is_appropriate(),
                    safety_score = verdict.safety_score(),
                    "External safety verdict received"
                );
                Ok(LayerOutcome::Verdict(verdict))
            }
            Ok(Err(e)) => {
                warn!(error = %e, "External safety check failed, continuing");
                Ok(LayerOutcome::Continue)
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.timeout.as_millis() as u64,
                    "External safety check timed out, continuing"
                );
                Ok(LayerOutcome::Continue)
            }
        }
    }
}
