//! Calendar-day derivations over the history log: streaks, the rolling
//! seven-day activity map and practice time within a window.
//!
//! All day comparisons use the calendar day of the session start in the
//! time zone of `now`.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::history::SessionRecord;

/// Session counts for the last seven calendar days, oldest first.
pub type WeeklyStats = BTreeMap<NaiveDate, u32>;

/// Calendar day of `at` in `tz`.
pub fn local_day<Tz: TimeZone>(at: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    at.with_timezone(tz).date_naive()
}

/// Consecutive days with at least one session, walking back from today.
///
/// No session today means a streak of 0, however long the run before it.
pub fn streak_days<Tz: TimeZone>(sessions: &[SessionRecord], now: &DateTime<Tz>) -> u32 {
    let tz = now.timezone();
    let days: HashSet<NaiveDate> = sessions.iter().map(|s| local_day(&s.started_at, &tz)).collect();

    let mut day = now.date_naive();
    let mut streak = 0;
    while days.contains(&day) {
        streak += 1;
        match day.pred_opt() {
            Some(prev) => day = prev,
            None => break,
        }
    }
    streak
}

/// Rebuild the seven-day map ending today. Days without sessions map to 0.
pub fn weekly_stats<Tz: TimeZone>(sessions: &[SessionRecord], now: &DateTime<Tz>) -> WeeklyStats {
    let tz = now.timezone();
    let today = now.date_naive();
    let first = today - Duration::days(6);

    let mut stats: WeeklyStats = (0..7).map(|i| (first + Duration::days(i), 0)).collect();
    for session in sessions {
        let day = local_day(&session.started_at, &tz);
        if let Some(count) = stats.get_mut(&day) {
            *count += 1;
        }
    }
    stats
}

/// Seconds practiced by sessions that started on or after `since`.
pub fn practice_seconds_since(sessions: &[SessionRecord], since: DateTime<Utc>) -> f64 {
    sessions
        .iter()
        .filter(|s| s.started_at >= since)
        .map(|s| s.duration_secs)
        .sum()
}

/// Seconds practiced by sessions that started in `[start, end)`.
pub fn practice_seconds_between(sessions: &[SessionRecord], start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    sessions
        .iter()
        .filter(|s| s.started_at >= start && s.started_at < end)
        .map(|s| s.duration_secs)
        .sum()
}

/// Start of the local day containing `now`.
pub fn start_of_day<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    start_of(now, now.date_naive())
}

/// Start of the local ISO week (Monday) containing `now`.
pub fn start_of_week<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let today = now.date_naive();
    let monday = today - Duration::days(today.weekday().num_days_from_monday() as i64);
    start_of(now, monday)
}

/// Start of the local month containing `now`.
pub fn start_of_month<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let today = now.date_naive();
    let first = today.with_day(1).unwrap_or(today);
    start_of(now, first)
}

fn start_of<Tz: TimeZone>(now: &DateTime<Tz>, day: NaiveDate) -> DateTime<Utc> {
    let tz = now.timezone();
    let midnight = day.and_hms_opt(0, 0, 0).unwrap_or_default();
    tz.from_local_datetime(&midnight)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        // Midnight skipped by a DST jump: fall back to the UTC reading.
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Practice time today and this week against the configured targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeProgress {
    pub today_secs: f64,
    pub week_secs: f64,
    pub daily_goal_secs: u64,
    pub weekly_goal_secs: u64,
    /// 0.0 ..= 1.0
    pub daily_fraction: f64,
    /// 0.0 ..= 1.0
    pub weekly_fraction: f64,
}

pub fn practice_progress<Tz: TimeZone>(
    sessions: &[SessionRecord],
    daily_goal_secs: u64,
    weekly_goal_secs: u64,
    now: &DateTime<Tz>,
) -> PracticeProgress {
    let today_secs = practice_seconds_since(sessions, start_of_day(now));
    let week_secs = practice_seconds_since(sessions, start_of_week(now));
    PracticeProgress {
        today_secs,
        week_secs,
        daily_goal_secs,
        weekly_goal_secs,
        daily_fraction: fraction(today_secs, daily_goal_secs),
        weekly_fraction: fraction(week_secs, weekly_goal_secs),
    }
}

fn fraction(value: f64, goal: u64) -> f64 {
    if goal == 0 {
        return 1.0;
    }
    (value / goal as f64).min(1.0)
}
