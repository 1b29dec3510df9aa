mod breathing;
mod catalog;
mod custom;
mod phase;

pub use breathing::{
    resolve_phase_duration, total_pattern_duration, BreathingMode, Pattern, PhaseDurations,
    BOX_PATTERN_ID, MAX_PHASE_SECS,
};
pub use catalog::PatternCatalog;
pub use custom::{CustomPattern, DifficultyLevel};
pub use phase::BreathPhase;
