//! Property-based tests for phase accounting and the history bound.

use std::time::{Duration, Instant};

use breathwork_core::pattern::BreathingMode;
use breathwork_core::{BreathPhase, HistoryStore, SessionRecord, SessionTimer, MAX_SESSIONS};
use chrono::Utc;
use proptest::prelude::*;

/// Tick steps in quarter seconds so every sum is exact in binary.
fn quarter_steps() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(1u64..=40, 1..60)
}

fn run_ticks(timer: &mut SessionTimer, t0: Instant, steps: &[u64], mut on_tick: impl FnMut(&SessionTimer)) -> u64 {
    let mut total_ms = 0;
    for step in steps {
        total_ms += step * 250;
        timer.tick(t0 + Duration::from_millis(total_ms)).unwrap();
        on_tick(timer);
    }
    total_ms
}

proptest! {
    #[test]
    fn box_cycles_follow_total_elapsed(steps in quarter_steps()) {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start(BreathingMode::Box.pattern(), 1.0, t0).unwrap();

        let total_ms = run_ticks(&mut timer, t0, &steps, |_| {});
        let total = total_ms as f64 / 1000.0;

        // However the time was split, the position is the same.
        let into_cycle = total % 16.0;
        prop_assert_eq!(timer.cycle_count() as u64, (total / 16.0).floor() as u64);
        prop_assert_eq!(timer.phase(), BreathPhase::ALL[(into_cycle / 4.0).floor() as usize]);
        prop_assert!((timer.phase_elapsed() - into_cycle % 4.0).abs() < 1e-9);
        prop_assert!((timer.session_elapsed() - total).abs() < 1e-9);
    }

    #[test]
    fn zero_length_pause_is_never_current(steps in quarter_steps()) {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start(BreathingMode::Relax.pattern(), 1.0, t0).unwrap();

        run_ticks(&mut timer, t0, &steps, |timer| {
            assert_ne!(timer.phase(), BreathPhase::HoldAfterExhale);
        });
    }

    #[test]
    fn scale_stays_in_range(steps in quarter_steps(), speed in 0.5f64..2.0) {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new();
        timer.start(BreathingMode::Relax.pattern(), speed, t0).unwrap();

        run_ticks(&mut timer, t0, &steps, |timer| {
            let scale = timer.scale();
            assert!((1.0..=1.5).contains(&scale), "scale {scale}");
            assert!(timer.remaining_secs() >= 0.0);
        });
    }

    #[test]
    fn history_never_exceeds_bound(n in 0usize..250) {
        let mut history = HistoryStore::new();
        let mut last = None;
        for i in 0..n {
            let record = SessionRecord::new(Utc::now(), 10.0, i as u32 + 1, "box");
            last = Some(record.id);
            history.append(record);
        }
        prop_assert_eq!(history.len(), n.min(MAX_SESSIONS));
        prop_assert_eq!(history.sessions().first().map(|r| r.id), last);
        if n > MAX_SESSIONS {
            // The survivors are the most recent MAX_SESSIONS appends.
            let oldest_kept = history.sessions().last().map(|r| r.cycles);
            prop_assert_eq!(oldest_kept, Some((n - MAX_SESSIONS + 1) as u32));
        }
    }
}
