//! Layered safety classifier.

use crate::{
    AgeCheck, AgeThresholdPolicy, ExternalSafetyLayer, KeywordLayer, LayerOutcome, SafetyLayer,
};
use sprout_config::SafetySettings;
use sprout_core::{ContentRecommendation, GeneratedActivity, SafetyVerdict};
use sprout_error::SproutResult;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

/// Screens text and content for a child of a given age.
///
/// Layers are consulted in order until one returns a verdict. The keyword
/// layer always comes first, so a deny-list match can never be overridden.
/// When no layer answers, a conservative default-safe verdict is used.
///
/// # Example
///
/// ```
/// use sprout_security::SafetyClassifier;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let classifier = SafetyClassifier::with_defaults()?;
/// let verdict = classifier.check("A story about violence", 9).await;
/// assert!(!verdict.is_appropriate());
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct SafetyClassifier {
    layers: Vec<Arc<dyn SafetyLayer>>,
    policy: AgeThresholdPolicy,
}

impl std::fmt::Debug for SafetyClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyClassifier")
            .field(
                "layers",
                &self.layers.iter().map(|l| l.name()).collect::<Vec<_>>(),
            )
            .field("policy", &self.policy)
            .finish()
    }
}

impl SafetyClassifier {
    /// Classifier starting with `keywords`, using `policy` for age checks.
    pub fn new(keywords: KeywordLayer, policy: AgeThresholdPolicy) -> Self {
        Self {
            layers: vec![Arc::new(keywords)],
            policy,
        }
    }

    /// Keyword layer over the built-in list and the default age policy.
    pub fn with_defaults() -> SproutResult<Self> {
        Ok(Self::new(
            KeywordLayer::with_defaults()?,
            AgeThresholdPolicy::default(),
        ))
    }

    /// Classifier built from settings: keyword layer with the configured
    /// extra terms, then the external service when it is configured.
    ///
    /// The model layer needs a model client and is appended by the caller
    /// with [`SafetyClassifier::with_layer`].
    #[instrument(skip(settings))]
    pub fn from_settings(settings: &SafetySettings) -> SproutResult<Self> {
        let keywords = KeywordLayer::new(settings.extra_keywords())?;
        let mut classifier = Self::new(
            keywords,
            AgeThresholdPolicy::new(*settings.min_safety_score()),
        );
        match ExternalSafetyLayer::from_settings(settings) {
            Some(external) => {
                info!(endpoint = external.endpoint(), "External safety service enabled");
                classifier = classifier.with_layer(external);
            }
            None => debug!("External safety service not configured"),
        }
        Ok(classifier)
    }

    /// Append a layer after the existing ones.
    pub fn with_layer(mut self, layer: impl SafetyLayer + 'static) -> Self {
        self.layers.push(Arc::new(layer));
        self
    }

    /// Names of the active layers, in evaluation order.
    pub fn layer_names(&self) -> Vec<&'static str> {
        self.layers.iter().map(|l| l.name()).collect()
    }

    /// Age policy used by the content checks.
    pub fn policy(&self) -> &AgeThresholdPolicy {
        &self.policy
    }

    /// Classify free text for a child of `child_age`.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn check(&self, text: &str, child_age: u8) -> SafetyVerdict {
        for layer in &self.layers {
            match layer.evaluate(text, child_age).await {
                Ok(LayerOutcome::Verdict(verdict)) => {
                    debug!(layer = layer.name(), "Layer returned a verdict");
                    return verdict;
                }
                Ok(LayerOutcome::Continue) => continue,
                Err(e) => {
                    error!(layer = layer.name(), error = %e, "Safety layer failed");
                    return SafetyVerdict::most_restrictive(format!(
                        "Safety layer '{}' failed",
                        layer.name()
                    ));
                }
            }
        }
        debug!("No layer answered, using default-safe verdict");
        SafetyVerdict::default_safe()
    }

    /// Compare a recommendation against the band limits for `child_age`.
    pub fn is_age_appropriate(&self, content: &ContentRecommendation, child_age: u8) -> AgeCheck {
        self.policy.check_recommendation(content, child_age)
    }

    /// Full screening of a recommendation: textual check of its title,
    /// description and tags, combined with the age check.
    #[instrument(skip(self, content), fields(title = %content.title))]
    pub async fn validate_content_safety(
        &self,
        content: &ContentRecommendation,
        child_age: u8,
    ) -> SafetyVerdict {
        let verdict = self.check(&content.screening_text(), child_age).await;
        let age = self.is_age_appropriate(content, child_age);
        verdict.with_age_check(age.passed, age.reasons)
    }

    /// Full screening of a study-plan activity: textual check of its
    /// free-text fields, combined with the band's difficulty and duration
    /// limits.
    #[instrument(skip(self, activity), fields(activity_id = %activity.id))]
    pub async fn check_activity(&self, activity: &GeneratedActivity, child_age: u8) -> SafetyVerdict {
        let verdict = self.check(&activity.screening_text(), child_age).await;
        let age = self.policy.check_activity(activity, child_age);
        verdict.with_age_check(age.passed, age.reasons)
    }
}
