//! Safety verdicts.

use serde::{Deserialize, Serialize};

/// Which classifier layer produced a verdict.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum VerdictSource {
    /// Keyword deny-list
    Keyword,
    /// External safety service
    #[default]
    External,
    /// Model-based classifier
    Model,
    /// Default-safe fallback
    Fallback,
    /// Most restrictive verdict after an internal failure
    Restrictive,
}

/// Stored safety rating of a piece of content.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SafetyRating {
    /// Not yet rated
    #[default]
    Unrated,
    /// Flagged by classification
    Flagged,
    /// Classified or parent-approved as safe
    Safe,
}

/// Outcome of screening one piece of content.
///
/// `parental_approval_required` is always true when the content is either
/// inappropriate or not age-appropriate; every constructor and the
/// deserializer enforce this.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
#[serde(rename_all = "camelCase", from = "VerdictWire")]
pub struct SafetyVerdict {
    is_appropriate: bool,
    safety_score: f64,
    age_appropriate: bool,
    educational_value: f64,
    flagged_concerns: Vec<String>,
    parental_approval_required: bool,
    reasons: Vec<String>,
    source: VerdictSource,
}

impl SafetyVerdict {
    /// Build a verdict. Scores are clamped to [0, 1] and the approval flag is
    /// forced on when either appropriateness flag is false.
    pub fn new(
        is_appropriate: bool,
        age_appropriate: bool,
        safety_score: f64,
        educational_value: f64,
        source: VerdictSource,
    ) -> Self {
        Self {
            is_appropriate,
            safety_score: unit(safety_score),
            age_appropriate,
            educational_value: unit(educational_value),
            flagged_concerns: Vec::new(),
            parental_approval_required: !is_appropriate || !age_appropriate,
            reasons: Vec::new(),
            source,
        }
    }

    /// Verdict for content matching the keyword deny-list.
    pub fn flagged(concerns: Vec<String>, source: VerdictSource) -> Self {
        let reason = format!("Matched prohibited terms: {}", concerns.join(", "));
        Self::new(false, false, 0.0, 0.0, source)
            .with_concerns(concerns)
            .with_reason(reason)
    }

    /// Conservative "likely safe" verdict used when no layer flagged anything.
    pub fn default_safe() -> Self {
        Self::new(true, true, 0.8, 0.7, VerdictSource::Fallback)
            .with_reason("No concerns found by available checks")
    }

    /// Verdict used when classification itself failed unexpectedly.
    pub fn most_restrictive(reason: impl Into<String>) -> Self {
        Self::new(false, false, 0.0, 0.0, VerdictSource::Restrictive)
            .with_concern("classification_failed")
            .with_reason(reason)
    }

    /// Add one flagged concern.
    pub fn with_concern(mut self, concern: impl Into<String>) -> Self {
        self.flagged_concerns.push(concern.into());
        self
    }

    /// Add several flagged concerns.
    pub fn with_concerns(mut self, concerns: impl IntoIterator<Item = String>) -> Self {
        self.flagged_concerns.extend(concerns);
        self
    }

    /// Add one reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    /// Force parental approval regardless of the flags.
    pub fn requiring_approval(mut self) -> Self {
        self.parental_approval_required = true;
        self
    }

    /// Fold an age-threshold outcome into this verdict.
    ///
    /// A failed age check clears `age_appropriate` and appends its reasons;
    /// a passed one leaves the verdict untouched.
    pub fn with_age_check(mut self, passed: bool, reasons: Vec<String>) -> Self {
        if !passed {
            self.age_appropriate = false;
            self.parental_approval_required = true;
            self.flagged_concerns.push("age_threshold".to_string());
            self.reasons.extend(reasons);
        }
        self
    }

    /// Whether content may be shown without a parent decision.
    pub fn is_clear(&self) -> bool {
        self.is_appropriate && self.age_appropriate && !self.parental_approval_required
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

/// Lenient wire shape accepted from external services and storage.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VerdictWire {
    #[serde(alias = "is_appropriate")]
    is_appropriate: bool,
    #[serde(default, alias = "safety_score")]
    safety_score: f64,
    #[serde(alias = "age_appropriate")]
    age_appropriate: bool,
    #[serde(default, alias = "educational_value")]
    educational_value: f64,
    #[serde(default, alias = "flagged_concerns", alias = "concerns")]
    flagged_concerns: Vec<String>,
    #[serde(default, alias = "parental_approval_required")]
    parental_approval_required: bool,
    #[serde(default)]
    reasons: Vec<String>,
    #[serde(default)]
    source: VerdictSource,
}

impl From<VerdictWire> for SafetyVerdict {
    fn from(wire: VerdictWire) -> Self {
        let mut verdict = SafetyVerdict::new(
            wire.is_appropriate,
            wire.age_appropriate,
            wire.safety_score,
            wire.educational_value,
            wire.source,
        )
        .with_concerns(wire.flagged_concerns);
        verdict.reasons = wire.reasons;
        if wire.parental_approval_required {
            verdict.parental_approval_required = true;
        }
        verdict
    }
}
