//! Age bands and their content thresholds.

use serde::{Deserialize, Serialize};

/// Named age bands, youngest first.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum AgeBand {
    /// Ages 3 to 5
    EarlyChildhood,
    /// Ages 6 to 10
    Elementary,
    /// Ages 11 to 13
    MiddleSchool,
    /// Ages 14 to 18
    HighSchool,
}

/// Content limits for one age band. Age bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_getters::Getters)]
pub struct AgeThreshold {
    band: AgeBand,
    min_age: u8,
    max_age: u8,
    max_difficulty: u8,
    max_duration_minutes: u32,
}

impl AgeThreshold {
    /// Create a threshold row.
    pub const fn new(
        band: AgeBand,
        min_age: u8,
        max_age: u8,
        max_difficulty: u8,
        max_duration_minutes: u32,
    ) -> Self {
        Self {
            band,
            min_age,
            max_age,
            max_difficulty,
            max_duration_minutes,
        }
    }

    /// Whether `age` falls inside this band.
    pub fn contains(&self, age: u8) -> bool {
        (self.min_age..=self.max_age).contains(&age)
    }
}
