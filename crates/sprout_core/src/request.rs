//! Generation request types.

use crate::ContentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Relative weights of the four learning styles.
///
/// The weights are independent of each other and need not sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct LearningStyle {
    /// Preference for pictures, diagrams and video
    #[serde(default)]
    pub visual: f64,
    /// Preference for listening and discussion
    #[serde(default)]
    pub auditory: f64,
    /// Preference for hands-on activities
    #[serde(default)]
    pub kinesthetic: f64,
    /// Preference for reading and writing
    #[serde(default)]
    pub reading_writing: f64,
}

impl LearningStyle {
    /// Create a learning style from its four weights.
    pub fn new(visual: f64, auditory: f64, kinesthetic: f64, reading_writing: f64) -> Self {
        Self {
            visual,
            auditory,
            kinesthetic,
            reading_writing,
        }
    }

    /// Copy with every weight forced non-negative and finite.
    pub fn non_negative(&self) -> Self {
        fn fix(w: f64) -> f64 {
            if w.is_finite() && w > 0.0 { w } else { 0.0 }
        }
        Self {
            visual: fix(self.visual),
            auditory: fix(self.auditory),
            kinesthetic: fix(self.kinesthetic),
            reading_writing: fix(self.reading_writing),
        }
    }
}

/// A request for a personalised study plan.
///
/// Immutable once submitted. Its identity is the cache key derived from the
/// fields that affect generation, not an assigned id.
///
/// # Examples
///
/// ```
/// use sprout_core::GenerationRequest;
///
/// let request = GenerationRequest::builder()
///     .child_id("child-1")
///     .subject("Mathematics")
///     .child_age(6u8)
///     .duration_minutes(60u32)
///     .objectives(vec!["count to 20".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(request.subject, "Mathematics");
/// assert!(request.topic.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GenerationRequest {
    /// Child the plan is generated for
    pub child_id: String,
    /// Subject plan this request belongs to, when one already exists
    #[builder(default)]
    #[serde(default)]
    pub subject_plan_id: Option<String>,
    /// Subject (e.g. "Mathematics")
    pub subject: String,
    /// Narrower topic within the subject
    #[builder(default)]
    #[serde(default)]
    pub topic: Option<String>,
    /// Grade descriptor (e.g. "1st grade")
    #[builder(default)]
    #[serde(default)]
    pub grade_level: Option<String>,
    /// Child age in years
    pub child_age: u8,
    /// Learning style weights
    #[builder(default)]
    #[serde(default)]
    pub learning_style: LearningStyle,
    /// Target session length in minutes
    #[builder(default = "30")]
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Learning objectives, in any order
    #[builder(default)]
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Summary of recent performance
    #[builder(default)]
    #[serde(default)]
    pub prior_performance: Option<String>,
    /// Preferred content kinds or themes
    #[builder(default)]
    #[serde(default)]
    pub content_preferences: Vec<String>,
    /// When the request was submitted
    #[builder(default = "Utc::now()")]
    #[serde(default = "Utc::now")]
    pub requested_at: DateTime<Utc>,
}

fn default_duration() -> u32 {
    30
}

impl GenerationRequest {
    /// Creates a new request builder.
    pub fn builder() -> GenerationRequestBuilder {
        GenerationRequestBuilder::default()
    }
}

/// A request for standalone content recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct RecommendationRequest {
    /// Child the recommendations are for
    pub child_id: String,
    /// Subject plan the recommendations attach to
    #[builder(default)]
    #[serde(default)]
    pub subject_plan_id: Option<String>,
    /// Subject
    pub subject: String,
    /// Topic within the subject
    pub topic: String,
    /// Child age in years
    pub child_age: u8,
    /// Content kinds to ask for; empty means any
    #[builder(default)]
    #[serde(default)]
    pub content_types: Vec<ContentType>,
}

impl RecommendationRequest {
    /// Creates a new request builder.
    pub fn builder() -> RecommendationRequestBuilder {
        RecommendationRequestBuilder::default()
    }
}
