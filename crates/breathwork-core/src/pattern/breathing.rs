use serde::{Deserialize, Serialize};

use super::phase::BreathPhase;
use crate::error::ValidationError;

/// Upper bound for a single phase, in seconds.
pub const MAX_PHASE_SECS: f64 = 60.0;

/// Pattern id of the box-breathing built-in, counted by mode mastery.
pub const BOX_PATTERN_ID: &str = "box";

/// Base durations (seconds) for each phase of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    pub inhale: f64,
    pub hold_after_inhale: f64,
    pub exhale: f64,
    pub hold_after_exhale: f64,
}

impl PhaseDurations {
    pub const fn new(inhale: f64, hold_after_inhale: f64, exhale: f64, hold_after_exhale: f64) -> Self {
        Self {
            inhale,
            hold_after_inhale,
            exhale,
            hold_after_exhale,
        }
    }

    pub fn get(&self, phase: BreathPhase) -> f64 {
        match phase {
            BreathPhase::Inhale => self.inhale,
            BreathPhase::HoldAfterInhale => self.hold_after_inhale,
            BreathPhase::Exhale => self.exhale,
            BreathPhase::HoldAfterExhale => self.hold_after_exhale,
        }
    }

    /// Sum of all four phases.
    pub fn cycle_secs(&self) -> f64 {
        BreathPhase::ALL.iter().map(|p| self.get(*p)).sum()
    }

    /// Seconds spent holding (either hold phase) per cycle.
    pub fn hold_secs(&self) -> f64 {
        self.hold_after_inhale + self.hold_after_exhale
    }

    /// Checks every bound a user-supplied pattern must satisfy.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("inhale", self.inhale),
            ("hold_after_inhale", self.hold_after_inhale),
            ("exhale", self.exhale),
            ("hold_after_exhale", self.hold_after_exhale),
        ];
        for (field, value) in fields {
            if !value.is_finite() || !(0.0..=MAX_PHASE_SECS).contains(&value) {
                return Err(ValidationError::OutOfBounds {
                    field: field.to_string(),
                    value,
                    min: 0.0,
                    max: MAX_PHASE_SECS,
                });
            }
        }
        if self.inhale <= 0.0 {
            return Err(ValidationError::invalid("inhale", "must be greater than zero"));
        }
        if self.exhale <= 0.0 {
            return Err(ValidationError::invalid("exhale", "must be greater than zero"));
        }
        Ok(())
    }
}

/// A resolved pattern the session timer can run.
///
/// Built-in modes have no cycle limit and run until stopped; custom
/// patterns carry a fixed cycle count and auto-stop when it is reached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub name: String,
    pub durations: PhaseDurations,
    #[serde(default)]
    pub cycles: Option<u32>,
}

impl Pattern {
    pub fn new(id: impl Into<String>, name: impl Into<String>, durations: PhaseDurations) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            durations,
            cycles: None,
        }
    }

    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = Some(cycles);
        self
    }
}

/// Base duration of `phase` in `pattern`, in seconds.
pub fn resolve_phase_duration(pattern: &Pattern, phase: BreathPhase) -> f64 {
    pattern.durations.get(phase)
}

/// Seconds in one full cycle of `pattern`.
pub fn total_pattern_duration(pattern: &Pattern) -> f64 {
    pattern.durations.cycle_secs()
}

/// Built-in breathing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathingMode {
    Box,
    Relax,
}

impl BreathingMode {
    pub const ALL: [BreathingMode; 2] = [BreathingMode::Box, BreathingMode::Relax];

    pub fn id(self) -> &'static str {
        match self {
            BreathingMode::Box => BOX_PATTERN_ID,
            BreathingMode::Relax => "relax",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            BreathingMode::Box => "Box Breathing",
            BreathingMode::Relax => "Relax",
        }
    }

    pub fn durations(self) -> PhaseDurations {
        match self {
            BreathingMode::Box => PhaseDurations::new(4.0, 4.0, 4.0, 4.0),
            BreathingMode::Relax => PhaseDurations::new(4.0, 7.0, 8.0, 0.0),
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.id() == id)
    }

    pub fn pattern(self) -> Pattern {
        Pattern::new(self.id(), self.display_name(), self.durations())
    }
}
