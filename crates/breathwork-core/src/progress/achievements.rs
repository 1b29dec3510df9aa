//! Achievement catalog and unlock state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metric an achievement or type-scoped goal is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressMetric {
    /// Number of sessions in the history log
    SessionCount,
    /// Whole seconds practiced
    TotalTime,
    TotalCycles,
    /// Consecutive days with practice, ending today
    Streak,
    /// Sessions of the box-breathing mode
    ModeMastery,
}

impl ProgressMetric {
    pub fn display_name(self) -> &'static str {
        match self {
            ProgressMetric::SessionCount => "Total Sessions",
            ProgressMetric::TotalTime => "Total Time",
            ProgressMetric::TotalCycles => "Total Cycles",
            ProgressMetric::Streak => "Daily Streak",
            ProgressMetric::ModeMastery => "Mode Master",
        }
    }
}

/// One milestone. `is_unlocked` and `date_unlocked` only move from locked
/// to unlocked; nothing but an explicit reset clears them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub metric: ProgressMetric,
    /// Display text. Treated as opaque, localizable content.
    pub title: String,
    pub description: String,
    pub required_value: u64,
    pub icon: String,
    #[serde(default)]
    pub is_unlocked: bool,
    #[serde(default)]
    pub date_unlocked: Option<DateTime<Utc>>,
}

impl Achievement {
    fn locked(
        id: &str,
        metric: ProgressMetric,
        title: &str,
        description: &str,
        required_value: u64,
        icon: &str,
    ) -> Self {
        Self {
            id: id.to_string(),
            metric,
            title: title.to_string(),
            description: description.to_string(),
            required_value,
            icon: icon.to_string(),
            is_unlocked: false,
            date_unlocked: None,
        }
    }

    /// Unlock if still locked and `value` meets the threshold.
    /// Returns `true` only on the transition.
    pub fn try_unlock(&mut self, value: u64, at: DateTime<Utc>) -> bool {
        if self.is_unlocked || value < self.required_value {
            return false;
        }
        self.is_unlocked = true;
        self.date_unlocked = Some(at);
        true
    }

    /// 0.0 .. 1.0 progress towards the threshold.
    pub fn progress(&self, value: u64) -> f64 {
        if self.is_unlocked || self.required_value == 0 {
            return 1.0;
        }
        (value as f64 / self.required_value as f64).min(1.0)
    }
}

/// The full catalog, all locked.
pub fn achievement_catalog() -> Vec<Achievement> {
    use ProgressMetric::*;
    vec![
        Achievement::locked("beginner", SessionCount, "Beginner", "Complete 5 sessions", 5, "1.circle.fill"),
        Achievement::locked("regular", SessionCount, "Regular", "Complete 25 sessions", 25, "2.circle.fill"),
        Achievement::locked("master", SessionCount, "Master", "Complete 100 sessions", 100, "3.circle.fill"),
        Achievement::locked(
            "one_minute_breather",
            TotalTime,
            "1 Minute Breather",
            "Practice for 1 minute in total",
            60,
            "timer",
        ),
        Achievement::locked("time_keeper", TotalTime, "Time Keeper", "Practice for 1 hour total", 3600, "clock.fill"),
        Achievement::locked("dedicated", TotalTime, "Dedicated", "Practice for 5 hours total", 18000, "clock.badge.fill"),
        Achievement::locked(
            "cycle_starter",
            TotalCycles,
            "Cycle Starter",
            "Complete 50 cycles",
            50,
            "arrow.triangle.2.circlepath",
        ),
        Achievement::locked(
            "cycle_master",
            TotalCycles,
            "Cycle Master",
            "Complete 500 cycles",
            500,
            "arrow.triangle.2.circlepath.circle.fill",
        ),
        Achievement::locked("streak_3", Streak, "3-Day Streak", "Practice for 3 days in a row", 3, "flame.fill"),
        Achievement::locked("streak_7", Streak, "7-Day Streak", "Practice for 7 days in a row", 7, "flame.circle.fill"),
        Achievement::locked(
            "box_master",
            ModeMastery,
            "Box Master",
            "Complete 10 box breathing sessions",
            10,
            "square.fill",
        ),
    ]
}

/// Lay stored unlock state over the current catalog.
///
/// Entries are matched by id; stored entries no longer in the catalog are
/// dropped and new catalog entries start locked.
pub fn merge_with_catalog(stored: Vec<Achievement>) -> Vec<Achievement> {
    let mut catalog = achievement_catalog();
    for entry in catalog.iter_mut() {
        if let Some(saved) = stored.iter().find(|s| s.id == entry.id) {
            entry.is_unlocked = saved.is_unlocked;
            entry.date_unlocked = saved.date_unlocked;
        }
    }
    catalog
}
