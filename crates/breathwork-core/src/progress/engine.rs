//! Derives achievement state and weekly activity from the history log.

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::achievements::{achievement_catalog, merge_with_catalog, Achievement, ProgressMetric};
use super::calendar::{streak_days, weekly_stats, WeeklyStats};
use crate::error::StorageError;
use crate::history::HistoryStore;
use crate::pattern::BOX_PATTERN_ID;
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Every metric evaluated against one history snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressValues {
    pub session_count: u64,
    pub total_time_secs: u64,
    pub total_cycles: u64,
    pub streak_days: u64,
    pub mode_mastery: u64,
}

impl ProgressValues {
    pub fn from_history<Tz: TimeZone>(history: &HistoryStore, now: &DateTime<Tz>) -> Self {
        let sessions = history.sessions();
        Self {
            session_count: history.total_sessions(),
            total_time_secs: history.total_duration().floor() as u64,
            total_cycles: history.total_cycles(),
            streak_days: streak_days(sessions, now) as u64,
            mode_mastery: sessions
                .iter()
                .filter(|s| s.pattern_id == BOX_PATTERN_ID)
                .count() as u64,
        }
    }

    pub fn get(&self, metric: ProgressMetric) -> u64 {
        match metric {
            ProgressMetric::SessionCount => self.session_count,
            ProgressMetric::TotalTime => self.total_time_secs,
            ProgressMetric::TotalCycles => self.total_cycles,
            ProgressMetric::Streak => self.streak_days,
            ProgressMetric::ModeMastery => self.mode_mastery,
        }
    }
}

/// Result of one recompute.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    /// Achievements that unlocked during this recompute, in catalog order.
    pub unlocked: Vec<Achievement>,
    pub weekly_stats: WeeklyStats,
    pub values: ProgressValues,
}

impl ProgressUpdate {
    pub fn achievements_changed(&self) -> bool {
        !self.unlocked.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct ProgressEngine {
    achievements: Vec<Achievement>,
    weekly_stats: WeeklyStats,
    values: ProgressValues,
}

impl Default for ProgressEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressEngine {
    pub fn new() -> Self {
        Self {
            achievements: achievement_catalog(),
            weekly_stats: WeeklyStats::new(),
            values: ProgressValues::default(),
        }
    }

    /// Restore unlock state and the last weekly map.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let stored: Vec<Achievement> = load_json(store, keys::ACHIEVEMENTS)?.unwrap_or_default();
        let weekly_stats: WeeklyStats = load_json(store, keys::WEEKLY_STATS)?.unwrap_or_default();
        Ok(Self {
            achievements: merge_with_catalog(stored),
            weekly_stats,
            values: ProgressValues::default(),
        })
    }

    pub fn save_achievements(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, keys::ACHIEVEMENTS, &self.achievements)
    }

    pub fn save_weekly_stats(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, keys::WEEKLY_STATS, &self.weekly_stats)
    }

    /// Recompute against the local clock.
    pub fn recompute(&mut self, history: &HistoryStore) -> ProgressUpdate {
        self.recompute_at(history, &Local::now())
    }

    /// Re-derive every metric from `history`, unlock what is due and
    /// replace the weekly map.
    ///
    /// Already-unlocked achievements are skipped, so repeated calls with
    /// the same history unlock nothing new.
    pub fn recompute_at<Tz: TimeZone>(&mut self, history: &HistoryStore, now: &DateTime<Tz>) -> ProgressUpdate {
        let values = ProgressValues::from_history(history, now);
        let unlocked_at = now.with_timezone(&Utc);

        let mut unlocked = Vec::new();
        for achievement in self.achievements.iter_mut().filter(|a| !a.is_unlocked) {
            if achievement.try_unlock(values.get(achievement.metric), unlocked_at) {
                info!(id = %achievement.id, title = %achievement.title, "achievement unlocked");
                unlocked.push(achievement.clone());
            }
        }

        self.weekly_stats = weekly_stats(history.sessions(), now);
        self.values = values;
        debug!(?values, unlocked = unlocked.len(), "progress recomputed");

        ProgressUpdate {
            unlocked,
            weekly_stats: self.weekly_stats.clone(),
            values,
        }
    }

    pub fn achievements(&self) -> &[Achievement] {
        &self.achievements
    }

    pub fn unlocked(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter().filter(|a| a.is_unlocked)
    }

    pub fn weekly_stats(&self) -> &WeeklyStats {
        &self.weekly_stats
    }

    /// Values from the most recent recompute.
    pub fn values(&self) -> ProgressValues {
        self.values
    }

    pub fn value_for(&self, metric: ProgressMetric) -> u64 {
        self.values.get(metric)
    }

    /// Relock every achievement.
    pub fn reset_achievements(&mut self) {
        self.achievements = achievement_catalog();
    }

    pub fn reset_weekly_stats(&mut self) {
        self.weekly_stats.clear();
    }
}
