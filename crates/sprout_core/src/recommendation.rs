//! Content recommendations suggested alongside a study plan.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Allowed recommendation length in minutes.
pub const RECOMMENDATION_DURATION_RANGE: RangeInclusive<u32> = 1..=180;

/// Media kind of a recommendation. Unknown labels become [`ContentType::Article`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ContentType {
    /// Video
    Video,
    /// Article or reading
    #[default]
    Article,
    /// Interactive resource
    Interactive,
}

impl ContentType {
    /// Coerce a model-supplied label, degrading unknown values to the default.
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or_default()
    }
}

/// A recommended piece of media, already bounded.
///
/// # Examples
///
/// ```
/// use sprout_core::{ContentRecommendation, ContentType};
///
/// let rec = ContentRecommendation::builder()
///     .title("Counting with blocks")
///     .content_type(ContentType::Video)
///     .safety_score(0.95)
///     .build()
///     .unwrap();
///
/// assert_eq!(rec.content_key(), "Counting with blocks");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct ContentRecommendation {
    /// Media kind
    #[builder(default)]
    pub content_type: ContentType,
    /// Title
    pub title: String,
    /// Description shown to the child
    #[builder(default)]
    pub description: String,
    /// Link to the resource
    #[builder(default)]
    pub url: Option<String>,
    /// Length in minutes, within [`RECOMMENDATION_DURATION_RANGE`]
    #[builder(default = "15")]
    pub duration_minutes: u32,
    /// Model's own age-appropriateness claim (informational only)
    #[builder(default)]
    pub age_appropriate: bool,
    /// Model's safety score in [0, 1]
    #[builder(default)]
    pub safety_score: f64,
    /// Where the content comes from
    #[builder(default)]
    pub source: String,
    /// Free-form tags
    #[builder(default)]
    pub tags: Vec<String>,
    /// Difficulty, within [`crate::DIFFICULTY_RANGE`]
    #[builder(default = "5")]
    pub difficulty: u8,
}

impl ContentRecommendation {
    /// Creates a new recommendation builder.
    pub fn builder() -> ContentRecommendationBuilder {
        ContentRecommendationBuilder::default()
    }

    /// Identity of the underlying content in the rating store: the URL when
    /// present, the title otherwise.
    pub fn content_key(&self) -> &str {
        self.url.as_deref().unwrap_or(&self.title)
    }

    /// Title, description and tags joined for safety screening.
    pub fn screening_text(&self) -> String {
        let mut parts = vec![self.title.as_str(), self.description.as_str()];
        parts.extend(self.tags.iter().map(String::as_str));
        parts.retain(|p| !p.is_empty());
        parts.join("\n")
    }
}
