//! Goal CRUD over an active set and a completed set.
//!
//! A goal lives in exactly one of the two sets. Reaching the target moves
//! it from active to completed in a single step.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::goal::{Goal, GoalPeriod, GoalSpan};
use crate::error::{GoalError, StorageError, ValidationError};
use crate::progress::{start_of_day, start_of_month, start_of_week, ProgressMetric, ProgressValues};
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// A candidate goal offered to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalSuggestion {
    pub title: String,
    pub target_secs: f64,
    pub period: GoalPeriod,
}

const SUGGESTIONS: [(&str, f64, GoalPeriod); 6] = [
    ("Daily Mindfulness", 300.0, GoalPeriod::Daily),
    ("Weekly Wellness", 2100.0, GoalPeriod::Weekly),
    ("Monthly Mastery", 9000.0, GoalPeriod::Monthly),
    ("Stress Relief", 600.0, GoalPeriod::Daily),
    ("Energy Boost", 180.0, GoalPeriod::Daily),
    ("Deep Focus", 900.0, GoalPeriod::Weekly),
];

#[derive(Debug, Clone, Default)]
pub struct GoalManager {
    active: Vec<Goal>,
    completed: Vec<Goal>,
}

impl GoalManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        Ok(Self {
            active: load_json(store, keys::GOALS_ACTIVE)?.unwrap_or_default(),
            completed: load_json(store, keys::GOALS_COMPLETED)?.unwrap_or_default(),
        })
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, keys::GOALS_ACTIVE, &self.active)?;
        save_json(store, keys::GOALS_COMPLETED, &self.completed)
    }

    pub fn active(&self) -> &[Goal] {
        &self.active
    }

    pub fn completed(&self) -> &[Goal] {
        &self.completed
    }

    pub fn get(&self, id: Uuid) -> Option<&Goal> {
        self.active
            .iter()
            .chain(self.completed.iter())
            .find(|g| g.id == id)
    }

    // ── Creation ─────────────────────────────────────────────────────

    /// Goal on a progress metric over `days` days, starting from the
    /// current value of that metric.
    pub fn create_metric_goal(
        &mut self,
        metric: ProgressMetric,
        target_value: u64,
        days: u32,
        values: &ProgressValues,
        now: DateTime<Utc>,
    ) -> Result<Goal, ValidationError> {
        let goal = Goal::build(
            metric.display_name().to_string(),
            Some(metric),
            target_value as f64,
            values.get(metric) as f64,
            GoalSpan::Days(days),
            now,
        )?;
        Ok(self.insert(goal))
    }

    /// Practice-time goal over one period, starting from zero.
    pub fn create_goal(
        &mut self,
        title: impl Into<String>,
        target_secs: f64,
        period: GoalPeriod,
        now: DateTime<Utc>,
    ) -> Result<Goal, ValidationError> {
        let goal = Goal::build(title.into(), None, target_secs, 0.0, GoalSpan::Period(period), now)?;
        Ok(self.insert(goal))
    }

    pub fn adopt(&mut self, suggestion: &GoalSuggestion, now: DateTime<Utc>) -> Result<Goal, ValidationError> {
        self.create_goal(suggestion.title.clone(), suggestion.target_secs, suggestion.period, now)
    }

    fn insert(&mut self, goal: Goal) -> Goal {
        info!(id = %goal.id, title = %goal.title, target = goal.target_value, "goal created");
        let created = goal.clone();
        self.active.push(goal);
        self.settle();
        self.get(created.id).cloned().unwrap_or(created)
    }

    // ── Progress ─────────────────────────────────────────────────────

    /// Add `delta` to an active goal. Returns the goal if this completed it.
    ///
    /// Progress only moves forward here; lowering it takes a `reset`.
    pub fn update_progress(&mut self, id: Uuid, delta: f64) -> Result<Option<Goal>, GoalError> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(ValidationError::invalid("delta", "must be a finite, non-negative number").into());
        }
        let goal = self
            .active
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(GoalError::NotFound(id))?;
        goal.current_value += delta;
        Ok(self.settle().into_iter().next())
    }

    /// Bring metric goals up to the latest progress values. Values only
    /// ever raise `current_value`. Returns goals completed by this refresh.
    pub fn refresh_from(&mut self, values: &ProgressValues) -> Vec<Goal> {
        for goal in self.active.iter_mut() {
            if let Some(metric) = goal.metric {
                goal.current_value = goal.current_value.max(values.get(metric) as f64);
            }
        }
        self.settle()
    }

    /// Credit a finished session's seconds to every running practice-time
    /// goal. Returns goals completed by it.
    pub fn add_practice(&mut self, secs: f64, now: DateTime<Utc>) -> Vec<Goal> {
        if !secs.is_finite() || secs <= 0.0 {
            return Vec::new();
        }
        for goal in self.active.iter_mut() {
            if goal.metric.is_none() && goal.start_date <= now && now < goal.end_date {
                goal.current_value += secs;
            }
        }
        self.settle()
    }

    /// Move every active goal that reached its target to the completed set.
    fn settle(&mut self) -> Vec<Goal> {
        let (done, still_active): (Vec<Goal>, Vec<Goal>) =
            std::mem::take(&mut self.active).into_iter().partition(Goal::is_completed);
        self.active = still_active;

        let mut moved = Vec::with_capacity(done.len());
        for mut goal in done {
            goal.is_active = false;
            info!(id = %goal.id, title = %goal.title, "goal completed");
            moved.push(goal.clone());
            self.completed.push(goal);
        }
        moved
    }

    // ── Mutation ─────────────────────────────────────────────────────

    /// Remove an active goal. Completed goals are kept.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.active.len();
        self.active.retain(|g| g.id != id);
        self.active.len() != before
    }

    /// Zero a goal's progress, restart its window at `now` and reactivate
    /// it.
    pub fn reset(&mut self, id: Uuid, now: DateTime<Utc>) -> Result<Goal, GoalError> {
        if let Some(goal) = self.active.iter_mut().find(|g| g.id == id) {
            goal.restart(now);
            return Ok(goal.clone());
        }
        let index = self
            .completed
            .iter()
            .position(|g| g.id == id)
            .ok_or(GoalError::NotFound(id))?;
        let mut goal = self.completed.remove(index);
        goal.restart(now);
        self.active.push(goal.clone());
        Ok(goal)
    }

    pub fn reset_all(&mut self) {
        self.active.clear();
        self.completed.clear();
    }

    // ── Suggestions and analytics ────────────────────────────────────

    /// Static suggestions minus titles already in the active set.
    pub fn suggestions(&self) -> Vec<GoalSuggestion> {
        SUGGESTIONS
            .iter()
            .filter(|(title, _, _)| !self.active.iter().any(|g| g.title == *title))
            .map(|(title, target_secs, period)| GoalSuggestion {
                title: title.to_string(),
                target_secs: *target_secs,
                period: *period,
            })
            .collect()
    }

    /// Progress of practice-time goals of `period` started within the
    /// current period.
    pub fn progress_for_period(&self, period: GoalPeriod, now: DateTime<Utc>) -> f64 {
        let since = match period {
            GoalPeriod::Daily => start_of_day(&now),
            GoalPeriod::Weekly => start_of_week(&now),
            GoalPeriod::Monthly => start_of_month(&now),
        };
        self.active
            .iter()
            .chain(self.completed.iter())
            .filter(|g| g.span == GoalSpan::Period(period) && g.start_date >= since)
            .map(|g| g.current_value)
            .sum()
    }

    /// A target slightly above current progress, never below the default.
    pub fn recommended_target(&self, period: GoalPeriod, now: DateTime<Utc>) -> f64 {
        let current = self.progress_for_period(period, now);
        match period {
            GoalPeriod::Daily => (current * 1.2).max(300.0),
            GoalPeriod::Weekly => (current * 1.15).max(2100.0),
            GoalPeriod::Monthly => (current * 1.1).max(9000.0),
        }
    }

    pub fn completion_rate(&self) -> f64 {
        let total = self.active.len() + self.completed.len();
        if total == 0 {
            return 0.0;
        }
        self.completed.len() as f64 / total as f64
    }

    /// Mean target of active goals, 0 when there are none.
    pub fn average_target(&self) -> f64 {
        if self.active.is_empty() {
            return 0.0;
        }
        self.active.iter().map(|g| g.target_value).sum::<f64>() / self.active.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap()
    }

    fn values(sessions: u64) -> ProgressValues {
        ProgressValues {
            session_count: sessions,
            ..ProgressValues::default()
        }
    }

    #[test]
    fn metric_goal_starts_from_live_value() {
        let mut goals = GoalManager::new();
        let goal = goals
            .create_metric_goal(ProgressMetric::SessionCount, 10, 7, &values(3), now())
            .unwrap();
        assert_eq!(goal.current_value, 3.0);
        assert_eq!(goal.end_date, now() + Duration::days(7));
        assert_eq!(goal.title, "Total Sessions");
    }

    #[test]
    fn title_goal_starts_at_zero() {
        let mut goals = GoalManager::new();
        let goal = goals.create_goal("Calm", 300.0, GoalPeriod::Daily, now()).unwrap();
        assert_eq!(goal.current_value, 0.0);
        assert_eq!(goal.end_date, now() + Duration::days(1));
        assert_eq!(goals.active().len(), 1);
    }

    #[test]
    fn update_progress_moves_completed_goal_atomically() {
        let mut goals = GoalManager::new();
        let goal = goals.create_goal("Calm", 300.0, GoalPeriod::Daily, now()).unwrap();

        assert!(goals.update_progress(goal.id, 200.0).unwrap().is_none());
        assert_eq!(goals.active()[0].current_value, 200.0);

        let done = goals.update_progress(goal.id, 100.0).unwrap().unwrap();
        assert_eq!(done.id, goal.id);
        assert!(!done.is_active);
        assert!(goals.active().is_empty());
        assert_eq!(goals.completed().len(), 1);
        assert!(goals.completed()[0].is_completed());
    }

    #[test]
    fn update_progress_unknown_goal() {
        let mut goals = GoalManager::new();
        let id = Uuid::new_v4();
        assert_eq!(goals.update_progress(id, 1.0), Err(GoalError::NotFound(id)));
    }

    #[test]
    fn update_progress_rejects_negative_delta() {
        let mut goals = GoalManager::new();
        let goal = goals.create_goal("Calm", 300.0, GoalPeriod::Daily, now()).unwrap();
        goals.update_progress(goal.id, 100.0).unwrap();

        match goals.update_progress(goal.id, -250.0) {
            Err(GoalError::Validation(err)) => assert_eq!(err.field(), "delta"),
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(goals.get(goal.id).unwrap().current_value, 100.0);
    }

    #[test]
    fn update_progress_rejects_non_finite_delta() {
        let db = Database::open_memory().unwrap();
        let mut goals = GoalManager::new();
        goals.create_goal("Keep", 600.0, GoalPeriod::Weekly, now()).unwrap();
        let goal = goals.create_goal("Calm", 300.0, GoalPeriod::Daily, now()).unwrap();
        goals.update_progress(goal.id, 100.0).unwrap();

        for delta in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                goals.update_progress(goal.id, delta),
                Err(GoalError::Validation(_))
            ));
        }
        assert_eq!(goals.get(goal.id).unwrap().current_value, 100.0);

        goals.save(&db).unwrap();
        let reloaded = GoalManager::load(&db).unwrap();
        assert_eq!(reloaded.active().len(), 2);
    }

    #[test]
    fn progress_only_drops_on_reset() {
        let mut goals = GoalManager::new();
        let goal = goals.create_goal("Calm", 300.0, GoalPeriod::Daily, now()).unwrap();
        goals.update_progress(goal.id, 120.0).unwrap();
        let _ = goals.update_progress(goal.id, -50.0);
        goals.add_practice(f64::NAN, now() + Duration::hours(1));
        goals.add_practice(-30.0, now() + Duration::hours(1));
        assert_eq!(goals.get(goal.id).unwrap().current_value, 120.0);

        let reset = goals.reset(goal.id, now()).unwrap();
        assert_eq!(reset.current_value, 0.0);
    }

    #[test]
    fn refresh_tracks_metric_and_completes() {
        let mut goals = GoalManager::new();
        let goal = goals
            .create_metric_goal(ProgressMetric::SessionCount, 5, 7, &values(1), now())
            .unwrap();
        goals.create_goal("Calm", 300.0, GoalPeriod::Daily, now()).unwrap();

        assert!(goals.refresh_from(&values(4)).is_empty());
        assert_eq!(goals.get(goal.id).unwrap().current_value, 4.0);

        // A lower value never decrements.
        goals.refresh_from(&values(2));
        assert_eq!(goals.get(goal.id).unwrap().current_value, 4.0);

        let done = goals.refresh_from(&values(5));
        assert_eq!(done.len(), 1);
        assert_eq!(goals.active().len(), 1);
        assert_eq!(goals.active()[0].title, "Calm");
    }

    #[test]
    fn add_practice_only_counts_running_title_goals() {
        let mut goals = GoalManager::new();
        let daily = goals.create_goal("Calm", 300.0, GoalPeriod::Daily, now()).unwrap();
        let metric = goals
            .create_metric_goal(ProgressMetric::TotalTime, 1000, 7, &values(0), now())
            .unwrap();

        goals.add_practice(120.0, now() + Duration::hours(1));
        assert_eq!(goals.get(daily.id).unwrap().current_value, 120.0);
        assert_eq!(goals.get(metric.id).unwrap().current_value, 0.0);

        // After the daily window closed.
        goals.add_practice(120.0, now() + Duration::days(2));
        assert_eq!(goals.get(daily.id).unwrap().current_value, 120.0);
    }

    #[test]
    fn delete_only_touches_active_set() {
        let mut goals = GoalManager::new();
        let done = goals.create_goal("Done", 10.0, GoalPeriod::Daily, now()).unwrap();
        goals.update_progress(done.id, 10.0).unwrap();

        assert!(!goals.delete(done.id));
        assert_eq!(goals.completed().len(), 1);

        let open = goals.create_goal("Open", 10.0, GoalPeriod::Daily, now()).unwrap();
        assert!(goals.delete(open.id));
        assert!(goals.active().is_empty());
    }

    #[test]
    fn reset_reactivates_completed_goal() {
        let mut goals = GoalManager::new();
        let goal = goals.create_goal("Calm", 10.0, GoalPeriod::Weekly, now()).unwrap();
        goals.update_progress(goal.id, 15.0).unwrap();

        let later = now() + Duration::days(3);
        let reset = goals.reset(goal.id, later).unwrap();
        assert_eq!(reset.current_value, 0.0);
        assert_eq!(reset.start_date, later);
        assert_eq!(reset.end_date, later + Duration::days(7));
        assert!(reset.is_active);
        assert_eq!(goals.active().len(), 1);
        assert!(goals.completed().is_empty());
    }

    #[test]
    fn suggestions_exclude_active_titles() {
        let mut goals = GoalManager::new();
        assert_eq!(goals.suggestions().len(), 6);

        let first = goals.suggestions().remove(0);
        goals.adopt(&first, now()).unwrap();
        let remaining = goals.suggestions();
        assert_eq!(remaining.len(), 5);
        assert!(remaining.iter().all(|s| s.title != first.title));
    }

    #[test]
    fn analytics() {
        let mut goals = GoalManager::new();
        assert_eq!(goals.completion_rate(), 0.0);
        assert_eq!(goals.average_target(), 0.0);
        assert_eq!(goals.recommended_target(GoalPeriod::Daily, now()), 300.0);

        let a = goals.create_goal("A", 400.0, GoalPeriod::Daily, now()).unwrap();
        goals.create_goal("B", 200.0, GoalPeriod::Daily, now()).unwrap();
        goals.update_progress(a.id, 350.0).unwrap();

        assert_eq!(goals.average_target(), 300.0);
        assert_eq!(goals.progress_for_period(GoalPeriod::Daily, now()), 350.0);
        assert_eq!(goals.recommended_target(GoalPeriod::Daily, now()), 420.0);

        let b = goals.active()[1].id;
        goals.update_progress(b, 200.0).unwrap();
        assert_eq!(goals.completion_rate(), 0.5);
    }

    #[test]
    fn save_and_load() {
        let db = Database::open_memory().unwrap();
        let mut goals = GoalManager::new();
        let done = goals.create_goal("Done", 10.0, GoalPeriod::Daily, now()).unwrap();
        goals.update_progress(done.id, 10.0).unwrap();
        goals.create_goal("Open", 10.0, GoalPeriod::Monthly, now()).unwrap();
        goals.save(&db).unwrap();

        let loaded = GoalManager::load(&db).unwrap();
        assert_eq!(loaded.active(), goals.active());
        assert_eq!(loaded.completed(), goals.completed());
    }
}
