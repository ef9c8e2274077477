//! Model-backed safety classification layer.

use crate::extraction::extract_json;
use crate::prompt::safety_prompt;
use async_trait::async_trait;
use serde_json::Value;
use sprout_core::{SafetyVerdict, VerdictSource};
use sprout_error::SproutResult;
use sprout_interface::ModelClient;
use sprout_security::{LayerOutcome, SafetyLayer};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Asks the generation model itself to classify text.
///
/// Runs after the external service, so it only answers when that service is
/// not configured or did not respond. Any failure continues to the default.
#[derive(Clone)]
pub struct ModelSafetyLayer {
    model: Arc<dyn ModelClient>,
    timeout: Duration,
}

impl std::fmt::Debug for ModelSafetyLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSafetyLayer")
            .field("model", &self.model.model_name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ModelSafetyLayer {
    /// Layer classifying with `model`, giving up after `timeout`.
    pub fn new(model: Arc<dyn ModelClient>, timeout: Duration) -> Self {
        Self { model, timeout }
    }

    async fn classify(&self, text: &str, child_age: u8) -> Option<SafetyVerdict> {
        let prompt = safety_prompt(text, child_age);
        let raw = match tokio::time::timeout(self.timeout, self.model.generate(&prompt)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(e)) => {
                warn!(error = %e, "Model safety check failed, continuing");
                return None;
            }
            Err(_) => {
                warn!("Model safety check timed out, continuing");
                return None;
            }
        };

        let Some(mut value) = extract_json(&raw)
            .ok()
            .and_then(|json| serde_json::from_str::<Value>(json).ok())
        else {
            warn!("Model safety response held no JSON, continuing");
            return None;
        };
        if let Value::Object(map) = &mut value {
            map.insert("source".to_string(), Value::from(VerdictSource::Model.to_string()));
        }
        match serde_json::from_value(value) {
            Ok(verdict) => Some(verdict),
            Err(e) => {
                warn!(error = %e, "Model safety verdict did not decode, continuing");
                None
            }
        }
    }
}

#[async_trait]
impl SafetyLayer for ModelSafetyLayer {
    fn name(&self) -> &'static str {
        "model"
    }

    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn evaluate(&self, text: &str, child_age: u8) -> SproutResult<LayerOutcome> {
        Ok(match self.classify(text, child_age).await {
            Some(verdict) => {
                debug!(is_appropriate = verdict.is_appropriate(), "Model safety verdict received");
                LayerOutcome::Verdict(verdict)
            }
            None => LayerOutcome::Continue,
        })
    }
}
