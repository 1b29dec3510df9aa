//! Integration tests for the session finalize chain.
//!
//! These tests drive `AppContext` from start to finalize and check what
//! reaches history, progress, goals and storage.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use breathwork_core::storage::keys;
use breathwork_core::{
    AppContext, CoreError, Database, Event, GoalPeriod, KeyValueStore, Settings, StorageError,
};

fn secs(s: u64) -> Duration {
    Duration::from_secs(s)
}

fn run_box(ctx: &mut AppContext, seconds: u64) -> breathwork_core::SessionOutcome {
    let t0 = Instant::now();
    ctx.start_session("box", t0).unwrap();
    ctx.stop_session(t0 + secs(seconds))
}

/// A store whose writes always fail.
struct ReadOnlyStore(Database);

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.0.get(key)
    }

    fn set(&self, _key: &str, _value: &[u8]) -> Result<(), StorageError> {
        Err(StorageError::Locked)
    }

    fn remove(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Locked)
    }
}

#[test]
fn test_four_box_cycles_end_to_end() {
    let mut ctx = AppContext::in_memory().unwrap();
    let events = Rc::new(RefCell::new(Vec::new()));
    {
        let events = Rc::clone(&events);
        ctx.subscribe(move |e| events.borrow_mut().push(e.kind()));
    }

    let t0 = Instant::now();
    ctx.start_session("box", t0).unwrap();
    for s in 1..=64 {
        ctx.tick_session(t0 + secs(s)).unwrap();
    }
    let outcome = ctx.stop_session(t0 + secs(64));

    let record = outcome.record.expect("session recorded");
    assert_eq!(record.cycles, 4);
    assert!((record.duration_secs - 64.0).abs() < 1e-6);
    assert_eq!(ctx.history().total_sessions(), 1);

    let events = events.borrow();
    assert_eq!(events.first(), Some(&"SessionStarted"));
    assert_eq!(events.iter().filter(|k| **k == "CycleCompleted").count(), 4);
    assert_eq!(events.iter().filter(|k| **k == "PhaseChanged").count(), 16);
    let finalized = events.iter().position(|k| *k == "SessionFinalized").unwrap();
    let unlocked = events.iter().position(|k| *k == "AchievementUnlocked").unwrap();
    assert!(finalized < unlocked);
}

#[test]
fn test_beginner_needs_five_sessions() {
    let mut ctx = AppContext::in_memory().unwrap();
    for _ in 0..4 {
        let outcome = run_box(&mut ctx, 64);
        assert!(outcome.unlocked.iter().all(|a| a.id != "beginner"));
    }
    let outcome = run_box(&mut ctx, 64);
    assert!(outcome.unlocked.iter().any(|a| a.id == "beginner"));
    assert_eq!(ctx.history().total_sessions(), 5);
}

#[test]
fn test_second_start_is_rejected() {
    let mut ctx = AppContext::in_memory().unwrap();
    let t0 = Instant::now();
    ctx.start_session("relax", t0).unwrap();
    assert!(matches!(
        ctx.start_session("box", t0),
        Err(breathwork_core::TimerError::AlreadyRunning)
    ));
    assert_eq!(ctx.timer().pattern().map(|p| p.id.as_str()), Some("relax"));
}

#[test]
fn test_zero_cycle_session_is_not_persisted() {
    let db = Database::open_memory().unwrap();
    let mut ctx = AppContext::with_store(Box::new(db), Settings::default()).unwrap();
    let outcome = run_box(&mut ctx, 15);
    assert!(outcome.record.is_none());
    assert!(matches!(outcome.events.last(), Some(Event::SessionDiscarded { .. })));
    assert!(ctx.history().is_empty());
}

#[test]
fn test_storage_failure_keeps_memory_state() {
    let store = ReadOnlyStore(Database::open_memory().unwrap());
    let mut ctx = AppContext::with_store(Box::new(store), Settings::default()).unwrap();
    ctx.create_goal("Calm", 1000.0, GoalPeriod::Daily).unwrap();
    assert!(!ctx.take_warnings().is_empty());

    let outcome = run_box(&mut ctx, 32);
    assert!(outcome.record.is_some());
    assert_eq!(ctx.history().len(), 1);
    assert_eq!(ctx.goals().active()[0].current_value, 32.0);
    assert!(outcome
        .warnings
        .iter()
        .all(|w| matches!(w, CoreError::Storage(StorageError::Locked))));
    // history, weekly stats, goals; achievements too when one unlocked
    assert!(outcome.warnings.len() >= 3);
}

#[test]
fn test_finalize_persists_every_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("breathwork.db");
    {
        let mut ctx = AppContext::with_store(
            Box::new(Database::open_at(&path).unwrap()),
            Settings::default(),
        )
        .unwrap();
        ctx.create_goal("Calm", 1000.0, GoalPeriod::Weekly).unwrap();
        // Long enough to unlock "1 Minute Breather", so achievements are written.
        run_box(&mut ctx, 64);
    }

    let db = Database::open_at(&path).unwrap();
    let stored = db.keys().unwrap();
    for key in [
        keys::SESSIONS,
        keys::ACHIEVEMENTS,
        keys::GOALS_ACTIVE,
        keys::GOALS_COMPLETED,
        keys::WEEKLY_STATS,
    ] {
        assert!(stored.iter().any(|k| k == key), "missing {key}");
    }
}
