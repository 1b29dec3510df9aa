use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::progress::ProgressMetric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalPeriod {
    Daily,
    Weekly,
    Monthly,
}

impl GoalPeriod {
    /// `start` plus exactly one period unit.
    pub fn end_from(self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            GoalPeriod::Daily => start + Duration::days(1),
            GoalPeriod::Weekly => start + Duration::weeks(1),
            GoalPeriod::Monthly => start
                .checked_add_months(Months::new(1))
                .unwrap_or(start + Duration::days(30)),
        }
    }
}

/// How long a goal runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GoalSpan {
    Period(GoalPeriod),
    Days(u32),
}

impl GoalSpan {
    pub fn end_from(self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            GoalSpan::Period(period) => period.end_from(start),
            GoalSpan::Days(days) => start + Duration::days(days as i64),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    Completed,
    Overdue,
    NearlyThere,
    InProgress,
}

/// The one completion rule used everywhere.
pub fn is_goal_completed(current_value: f64, target_value: f64) -> bool {
    current_value >= target_value
}

/// A user goal.
///
/// Type-scoped goals carry a `metric` and track the matching progress
/// value; title goals accumulate practice seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub metric: Option<ProgressMetric>,
    pub target_value: f64,
    pub current_value: f64,
    pub span: GoalSpan,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
}

impl Goal {
    pub(crate) fn build(
        title: String,
        metric: Option<ProgressMetric>,
        target_value: f64,
        current_value: f64,
        span: GoalSpan,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if title.trim().is_empty() {
            return Err(ValidationError::Empty("title".into()));
        }
        if !target_value.is_finite() || target_value <= 0.0 {
            return Err(ValidationError::invalid("target_value", "must be greater than zero"));
        }
        if span == GoalSpan::Days(0) {
            return Err(ValidationError::invalid("duration_days", "must be at least 1"));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            metric,
            target_value,
            current_value,
            span,
            start_date: now,
            end_date: span.end_from(now),
            is_active: true,
        })
    }

    pub fn is_completed(&self) -> bool {
        is_goal_completed(self.current_value, self.target_value)
    }

    /// 0.0 ..= 1.0
    pub fn progress(&self) -> f64 {
        (self.current_value / self.target_value).clamp(0.0, 1.0)
    }

    pub fn progress_percentage(&self) -> u32 {
        (self.progress() * 100.0) as u32
    }

    pub fn remaining(&self) -> f64 {
        (self.target_value - self.current_value).max(0.0)
    }

    pub fn days_remaining(&self, now: DateTime<Utc>) -> i64 {
        (self.end_date - now).num_days()
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.end_date && !self.is_completed()
    }

    pub fn status(&self, now: DateTime<Utc>) -> GoalStatus {
        if self.is_completed() {
            GoalStatus::Completed
        } else if self.is_overdue(now) {
            GoalStatus::Overdue
        } else if self.progress() > 0.7 {
            GoalStatus::NearlyThere
        } else {
            GoalStatus::InProgress
        }
    }

    /// Zero progress and a fresh window starting at `now`.
    pub(crate) fn restart(&mut self, now: DateTime<Utc>) {
        self.current_value = 0.0;
        self.start_date = now;
        self.end_date = self.span.end_from(now);
        self.is_active = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 31, 9, 0, 0).unwrap()
    }

    fn goal(target: f64, current: f64, span: GoalSpan) -> Goal {
        Goal::build("Test".into(), None, target, current, span, now()).unwrap()
    }

    #[test]
    fn periods_add_one_unit() {
        assert_eq!(GoalPeriod::Daily.end_from(now()), now() + Duration::days(1));
        assert_eq!(GoalPeriod::Weekly.end_from(now()), now() + Duration::days(7));
        // Jan 31 + 1 month clamps to the end of February.
        assert_eq!(
            GoalPeriod::Monthly.end_from(now()),
            Utc.with_ymd_and_hms(2026, 2, 28, 9, 0, 0).unwrap()
        );
        assert_eq!(GoalSpan::Days(10).end_from(now()), now() + Duration::days(10));
    }

    #[test]
    fn build_validates_input() {
        let err = Goal::build(" ".into(), None, 10.0, 0.0, GoalSpan::Days(1), now()).unwrap_err();
        assert_eq!(err.field(), "title");
        let err = Goal::build("x".into(), None, 0.0, 0.0, GoalSpan::Days(1), now()).unwrap_err();
        assert_eq!(err.field(), "target_value");
        let err = Goal::build("x".into(), None, 5.0, 0.0, GoalSpan::Days(0), now()).unwrap_err();
        assert_eq!(err.field(), "duration_days");
    }

    #[test]
    fn completion_is_derived() {
        let mut g = goal(300.0, 299.0, GoalSpan::Period(GoalPeriod::Daily));
        assert!(!g.is_completed());
        g.current_value = 300.0;
        assert!(g.is_completed());
        assert_eq!(g.status(now()), GoalStatus::Completed);
    }

    #[test]
    fn progress_accessors() {
        let g = goal(200.0, 150.0, GoalSpan::Period(GoalPeriod::Weekly));
        assert_eq!(g.progress(), 0.75);
        assert_eq!(g.progress_percentage(), 75);
        assert_eq!(g.remaining(), 50.0);
        assert_eq!(g.days_remaining(now()), 7);
        assert_eq!(g.status(now()), GoalStatus::NearlyThere);

        let later = now() + Duration::days(8);
        assert!(g.is_overdue(later));
        assert_eq!(g.status(later), GoalStatus::Overdue);
    }

    #[test]
    fn restart_recomputes_window() {
        let mut g = goal(100.0, 40.0, GoalSpan::Period(GoalPeriod::Daily));
        g.is_active = false;
        let later = now() + Duration::days(3);
        g.restart(later);
        assert_eq!(g.current_value, 0.0);
        assert_eq!(g.start_date, later);
        assert_eq!(g.end_date, later + Duration::days(1));
        assert!(g.is_active);
    }
}
