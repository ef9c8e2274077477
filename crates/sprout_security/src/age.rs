//! Age-banded content thresholds.

use serde::Serialize;
use sprout_core::{AgeBand, AgeThreshold, ContentRecommendation, GeneratedActivity};

/// Band table, youngest first. Inclusive and gap-free over ages 3 to 18.
const BANDS: [AgeThreshold; 4] = [
    AgeThreshold::new(AgeBand::EarlyChildhood, 3, 5, 3, 15),
    AgeThreshold::new(AgeBand::Elementary, 6, 10, 5, 30),
    AgeThreshold::new(AgeBand::MiddleSchool, 11, 13, 7, 45),
    AgeThreshold::new(AgeBand::HighSchool, 14, 18, 10, 60),
];

/// Outcome of comparing one piece of content against an age band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgeCheck {
    /// Whether every limit was respected
    pub passed: bool,
    /// Band the child's age resolved to
    pub band: AgeBand,
    /// One entry per violated limit
    pub reasons: Vec<String>,
}

/// Resolves ages to bands and checks content against band limits.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgeThresholdPolicy {
    min_safety_score: f64,
}

impl Default for AgeThresholdPolicy {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl AgeThresholdPolicy {
    /// Policy requiring recommendations to score at least `min_safety_score`.
    pub fn new(min_safety_score: f64) -> Self {
        Self { min_safety_score }
    }

    /// All bands, youngest first.
    pub fn thresholds() -> &'static [AgeThreshold] {
        &BANDS
    }

    /// Band for `age`. Ages under 3 use the youngest band and ages over 18
    /// the oldest.
    pub fn band_for(age: u8) -> &'static AgeThreshold {
        let (youngest, oldest) = (&BANDS[0], &BANDS[BANDS.len() - 1]);
        if age < *youngest.min_age() {
            return youngest;
        }
        BANDS.iter().find(|band| band.contains(age)).unwrap_or(oldest)
    }

    /// Minimum safety score a recommendation needs.
    pub fn min_safety_score(&self) -> f64 {
        self.min_safety_score
    }

    /// Check a recommendation's difficulty, duration and safety score.
    pub fn check_recommendation(&self, content: &ContentRecommendation, age: u8) -> AgeCheck {
        let band = Self::band_for(age);
        let mut reasons = limit_reasons(band, content.difficulty, content.duration_minutes);
        if content.safety_score.is_nan() || content.safety_score < self.min_safety_score {
            reasons.push(format!(
                "Safety score {:.2} is below the required {:.2}",
                content.safety_score, self.min_safety_score
            ));
        }
        finish(band, reasons)
    }

    /// Check an activity's difficulty and duration.
    pub fn check_activity(&self, activity: &GeneratedActivity, age: u8) -> AgeCheck {
        let band = Self::band_for(age);
        let reasons = limit_reasons(band, activity.difficulty, activity.duration_minutes);
        finish(band, reasons)
    }
}

fn limit_reasons(band: &AgeThreshold, difficulty: u8, duration_minutes: u32) -> Vec<String> {
    let mut reasons = Vec::new();
    if difficulty > *band.max_difficulty() {
        reasons.push(format!(
            "Difficulty {} exceeds the {} maximum of {}",
            difficulty,
            band.band(),
            band.max_difficulty()
        ));
    }
    if duration_minutes > *band.max_duration_minutes() {
        reasons.push(format!(
            "Duration of {} minutes exceeds the {} maximum of {}",
            duration_minutes,
            band.band(),
            band.max_duration_minutes()
        ));
    }
    reasons
}

fn finish(band: &AgeThreshold, reasons: Vec<String>) -> AgeCheck {
    AgeCheck {
        passed: reasons.is_empty(),
        band: *band.band(),
        reasons,
    }
}
