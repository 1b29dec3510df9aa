//! Progress derivation: achievements, streaks, weekly activity and
//! practice time, all computed from the history log.

mod achievements;
mod calendar;
mod engine;

pub use achievements::{achievement_catalog, merge_with_catalog, Achievement, ProgressMetric};
pub use calendar::{
    local_day, practice_progress, practice_seconds_between, practice_seconds_since, start_of_day, start_of_month,
    start_of_week, streak_days, weekly_stats, PracticeProgress, WeeklyStats,
};
pub use engine::{ProgressEngine, ProgressUpdate, ProgressValues};
