//! Generated study plans.

use crate::{ContentRecommendation, GeneratedActivity};
use serde::{Deserialize, Serialize};

/// A sanitized study plan: every field defaulted, every number clamped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct GeneratedStudyPlan {
    title: String,
    description: String,
    subject: String,
    total_duration_minutes: u32,
    activities: Vec<GeneratedActivity>,
    recommendations: Vec<ContentRecommendation>,
    learning_objectives: Vec<String>,
}

impl GeneratedStudyPlan {
    /// Assemble a plan; the total duration is derived from the activities.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        subject: impl Into<String>,
        activities: Vec<GeneratedActivity>,
        recommendations: Vec<ContentRecommendation>,
        learning_objectives: Vec<String>,
    ) -> Self {
        let total_duration_minutes = activities.iter().map(|a| a.duration_minutes).sum();
        Self {
            title: title.into(),
            description: description.into(),
            subject: subject.into(),
            total_duration_minutes,
            activities,
            recommendations,
            learning_objectives,
        }
    }

    /// Copy of this plan keeping only the activities that pass `keep` and
    /// dropping all recommendations. The total duration is recomputed.
    pub fn retain_activities(&self, keep: impl Fn(&GeneratedActivity) -> bool) -> Self {
        let activities: Vec<_> = self.activities.iter().filter(|a| keep(a)).cloned().collect();
        Self::new(
            self.title.clone(),
            self.description.clone(),
            self.subject.clone(),
            activities,
            Vec::new(),
            self.learning_objectives.clone(),
        )
    }
}
