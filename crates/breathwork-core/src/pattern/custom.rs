//! User-defined breathing patterns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::breathing::{Pattern, PhaseDurations};
use crate::error::ValidationError;

/// Difficulty bucket derived from cycle length, cycle count and hold share.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl DifficultyLevel {
    pub fn from_score(score: f64) -> Self {
        if score < 50.0 {
            DifficultyLevel::Beginner
        } else if score < 100.0 {
            DifficultyLevel::Intermediate
        } else if score < 200.0 {
            DifficultyLevel::Advanced
        } else {
            DifficultyLevel::Expert
        }
    }
}

/// A custom pattern: validated phase durations plus a fixed cycle count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomPattern {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub durations: PhaseDurations,
    pub cycles: u32,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}

impl CustomPattern {
    /// Validates and builds a new pattern.
    ///
    /// Rejects empty names, zero inhale/exhale, phases outside
    /// `0..=MAX_PHASE_SECS` and a cycle count of zero.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        durations: PhaseDurations,
        cycles: u32,
    ) -> Result<Self, ValidationError> {
        let pattern = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: description.into(),
            durations,
            cycles,
            is_favorite: false,
            created_at: Utc::now(),
        };
        pattern.validate()?;
        Ok(pattern)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::Empty("name".into()));
        }
        self.durations.validate()?;
        if self.cycles < 1 {
            return Err(ValidationError::invalid("cycles", "must be at least 1"));
        }
        Ok(())
    }

    /// Seconds in one cycle.
    pub fn cycle_secs(&self) -> f64 {
        self.durations.cycle_secs()
    }

    /// Seconds for the whole session at normal speed.
    pub fn total_session_secs(&self) -> f64 {
        self.cycle_secs() * self.cycles as f64
    }

    pub fn difficulty_score(&self) -> f64 {
        let cycle = self.cycle_secs();
        if cycle <= 0.0 {
            return 0.0;
        }
        let complexity = self.durations.hold_secs() / cycle;
        (cycle * self.cycles as f64 * (1.0 + complexity)) / 100.0
    }

    pub fn difficulty_level(&self) -> DifficultyLevel {
        DifficultyLevel::from_score(self.difficulty_score())
    }

    /// Timer-ready pattern with this pattern's cycle limit.
    pub fn to_pattern(&self) -> Pattern {
        Pattern::new(self.id.to_string(), self.name.clone(), self.durations).with_cycles(self.cycles)
    }
}

/// Patterns seeded into an empty catalog.
pub(crate) fn predefined() -> Vec<(&'static str, &'static str, PhaseDurations, u32)> {
    vec![
        (
            "4-7-8 Sleep",
            "Perfect for falling asleep quickly",
            PhaseDurations::new(4.0, 7.0, 8.0, 0.0),
            4,
        ),
        (
            "Box Breathing",
            "Military technique for focus and calm",
            PhaseDurations::new(4.0, 4.0, 4.0, 4.0),
            5,
        ),
        (
            "Triangle Breathing",
            "Simple pattern for beginners",
            PhaseDurations::new(3.0, 3.0, 3.0, 0.0),
            10,
        ),
        (
            "Energy Boost",
            "Quick energizing breathing",
            PhaseDurations::new(2.0, 1.0, 2.0, 0.0),
            15,
        ),
        (
            "Deep Relaxation",
            "Slow breathing for deep relaxation",
            PhaseDurations::new(6.0, 8.0, 10.0, 2.0),
            3,
        ),
    ]
}
