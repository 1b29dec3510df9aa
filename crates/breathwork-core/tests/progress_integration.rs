//! Integration tests for progress derivation over the history log.

use breathwork_core::progress::{streak_days, weekly_stats};
use breathwork_core::{
    GoalManager, HistoryStore, ProgressEngine, ProgressMetric, ProgressValues, SessionRecord,
};
use chrono::{DateTime, Duration, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 20, 20, 0, 0).unwrap()
}

fn session(days_ago: i64, hour_offset: i64, pattern: &str) -> SessionRecord {
    SessionRecord::new(
        now() - Duration::days(days_ago) - Duration::hours(hour_offset),
        120.0,
        6,
        pattern,
    )
}

fn history(records: Vec<SessionRecord>) -> HistoryStore {
    let mut history = HistoryStore::new();
    for record in records {
        history.append(record);
    }
    history
}

#[test]
fn test_streak_stops_at_first_gap() {
    let log = history(vec![
        session(4, 1, "box"),
        session(2, 1, "box"),
        session(2, 2, "box"),
        session(1, 1, "relax"),
        session(0, 1, "box"),
        session(0, 2, "box"),
        session(0, 3, "box"),
    ]);
    assert_eq!(streak_days(log.sessions(), &now()), 3);

    let mut engine = ProgressEngine::new();
    let update = engine.recompute_at(&log, &now());
    assert_eq!(update.values.streak_days, 3);
    assert!(update.unlocked.iter().any(|a| a.id == "streak_3"));
    assert!(!engine.unlocked().any(|a| a.id == "streak_7"));
}

#[test]
fn test_weekly_stats_full_replace() {
    let log = history(vec![session(0, 1, "box"), session(6, 1, "box"), session(7, 1, "box")]);
    let stats = weekly_stats(log.sessions(), &now());
    let counts: Vec<u32> = stats.values().copied().collect();
    assert_eq!(counts, vec![1, 0, 0, 0, 0, 0, 1]);
}

#[test]
fn test_metric_goals_recompute_from_history() {
    let log = history((0..7).map(|i| session(i % 3, i, "box")).collect());
    let values = ProgressValues::from_history(&log, &now());

    let mut a = GoalManager::new();
    let mut b = GoalManager::new();
    let zero = ProgressValues::default();
    for goals in [&mut a, &mut b] {
        goals
            .create_metric_goal(ProgressMetric::SessionCount, 50, 30, &zero, now())
            .unwrap();
        goals
            .create_metric_goal(ProgressMetric::TotalTime, 10_000, 30, &zero, now())
            .unwrap();
        goals.refresh_from(&values);
    }

    let current = |g: &GoalManager| g.active().iter().map(|g| g.current_value).collect::<Vec<_>>();
    assert_eq!(current(&a), current(&b));
    assert_eq!(current(&a), vec![7.0, 840.0]);
}

#[test]
fn test_unlocks_are_monotonic() {
    let log = history((0..10).map(|i| session(0, i % 5, "box")).collect());
    let mut engine = ProgressEngine::new();

    let first = engine.recompute_at(&log, &now());
    let ids: Vec<String> = first.unlocked.iter().map(|a| a.id.clone()).collect();
    assert!(ids.contains(&"box_master".to_string()));
    assert!(ids.contains(&"beginner".to_string()));

    for _ in 0..3 {
        let again = engine.recompute_at(&log, &now());
        assert!(again.unlocked.is_empty());
    }
    for id in &ids {
        assert!(engine.unlocked().any(|a| &a.id == id));
    }
}
