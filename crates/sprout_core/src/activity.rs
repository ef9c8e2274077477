//! Generated study-plan activities.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Allowed activity length in minutes.
pub const ACTIVITY_DURATION_RANGE: RangeInclusive<u32> = 1..=120;

/// Allowed difficulty for activities and recommendations.
pub const DIFFICULTY_RANGE: RangeInclusive<u8> = 1..=10;

/// Kind of learning activity.
///
/// Parsing is case-insensitive; anything unrecognised becomes
/// [`ActivityType::Exercise`], which needs no external media.
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
pub enum ActivityType {
    /// Watch a video
    Video,
    /// Read an article
    Article,
    /// Interactive exercise or simulation
    Interactive,
    /// Short quiz
    Quiz,
    /// Offline practice exercise
    #[default]
    Exercise,
}

impl ActivityType {
    /// Coerce a model-supplied label, degrading unknown values to the default.
    ///
    /// # Examples
    ///
    /// ```
    /// use sprout_core::ActivityType;
    ///
    /// assert_eq!(ActivityType::from_label(" VIDEO "), ActivityType::Video);
    /// assert_eq!(ActivityType::from_label("hologram"), ActivityType::Exercise);
    /// ```
    pub fn from_label(label: &str) -> Self {
        label.trim().parse().unwrap_or_default()
    }
}

/// One activity of a generated study plan, already bounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_builder::Builder)]
#[builder(setter(into))]
pub struct GeneratedActivity {
    /// Identifier, from the model or positional
    pub id: String,
    /// Short title
    pub title: String,
    /// What the child does
    #[builder(default)]
    pub description: String,
    /// Kind of activity
    #[builder(default)]
    pub activity_type: ActivityType,
    /// Length in minutes, within [`ACTIVITY_DURATION_RANGE`]
    #[builder(default = "15")]
    pub duration_minutes: u32,
    /// Difficulty, within [`DIFFICULTY_RANGE`]
    #[builder(default = "5")]
    pub difficulty: u8,
    /// Objectives covered
    #[builder(default)]
    pub objectives: Vec<String>,
    /// Step-by-step instructions
    #[builder(default)]
    pub instructions: String,
    /// Materials needed
    #[builder(default)]
    pub materials: Vec<String>,
    /// How success is judged
    #[builder(default)]
    pub assessment_criteria: Vec<String>,
}

impl GeneratedActivity {
    /// Creates a new activity builder.
    pub fn builder() -> GeneratedActivityBuilder {
        GeneratedActivityBuilder::default()
    }

    /// All free-text fields joined for safety screening.
    pub fn screening_text(&self) -> String {
        let mut parts = vec![
            self.title.as_str(),
            self.description.as_str(),
            self.instructions.as_str(),
        ];
        parts.extend(self.objectives.iter().map(String::as_str));
        parts.extend(self.materials.iter().map(String::as_str));
        parts.extend(self.assessment_criteria.iter().map(String::as_str));
        parts.retain(|p| !p.is_empty());
        parts.join("\n")
    }
}
