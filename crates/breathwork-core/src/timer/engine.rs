//! Session timer implementation.
//!
//! The timer is a wall-clock-based phase state machine. It does not use
//! internal threads - the caller is responsible for calling `tick()`
//! periodically with the current instant. Ticks may arrive at irregular
//! intervals; the delta since the previous tick is applied in one go and any
//! overshoot carries into the following phase.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (stop | auto-stop at cycle limit) -> Idle
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = SessionTimer::new();
//! timer.start(BreathingMode::Box.pattern(), 1.0, Instant::now())?;
//! // In a loop:
//! let events = timer.tick(Instant::now())?;
//! // When the user is done:
//! let summary = timer.stop();
//! ```

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::TimerError;
use crate::events::Event;
use crate::history::SessionRecord;
use crate::pattern::{resolve_phase_duration, total_pattern_duration, BreathPhase, Pattern};

/// Breathing scale at rest and at the end of an inhale.
pub const SCALE_MIN: f64 = 1.0;
pub const SCALE_MAX: f64 = 1.5;
/// Scale held during either hold phase.
pub const SCALE_HOLD: f64 = 1.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
}

/// What a session amounted to when it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub pattern_id: String,
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub cycles: u32,
}

impl SessionSummary {
    /// Whether the session made enough progress to be kept.
    pub fn is_recordable(&self) -> bool {
        self.cycles > 0 && self.elapsed_secs > 0.0
    }

    /// Finalize into a history record. Sessions with zero cycles or zero
    /// duration are discarded.
    pub fn into_record(self) -> Option<SessionRecord> {
        if !self.is_recordable() {
            return None;
        }
        Some(SessionRecord::new(
            self.started_at,
            self.elapsed_secs,
            self.cycles,
            self.pattern_id,
        ))
    }
}

/// Observable state after a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: TimerState,
    pub pattern_id: Option<String>,
    pub phase: BreathPhase,
    pub phase_label: String,
    /// Seconds left in the current phase, floored at 0.
    pub remaining_secs: f64,
    /// 0.0 .. 1.0 progress within the current phase.
    pub phase_progress: f64,
    pub scale: f64,
    pub cycle_count: u32,
    pub session_elapsed_secs: f64,
}

#[derive(Debug, Clone)]
struct RunningSession {
    pattern: Pattern,
    speed: f64,
    phase: BreathPhase,
    phase_elapsed: f64,
    cycle_count: u32,
    session_elapsed: f64,
    last_tick: Instant,
    started_at: DateTime<Utc>,
}

impl RunningSession {
    fn effective_duration(&self, phase: BreathPhase) -> f64 {
        resolve_phase_duration(&self.pattern, phase) * self.speed
    }

    fn phase_progress(&self) -> f64 {
        let total = self.effective_duration(self.phase);
        if total <= 0.0 {
            return 1.0;
        }
        (self.phase_elapsed / total).clamp(0.0, 1.0)
    }
}

/// Breathing scale for a phase at the given progress fraction.
///
/// Inhale rises linearly from 1.0 to 1.5, exhale falls from 1.5 to 1.0 and
/// both holds stay at 1.25.
pub fn breathing_scale(phase: BreathPhase, progress: f64) -> f64 {
    let progress = progress.clamp(0.0, 1.0);
    match phase {
        BreathPhase::Inhale => SCALE_MIN + progress * (SCALE_MAX - SCALE_MIN),
        BreathPhase::Exhale => SCALE_MAX - progress * (SCALE_MAX - SCALE_MIN),
        BreathPhase::HoldAfterInhale | BreathPhase::HoldAfterExhale => SCALE_HOLD,
    }
}

/// Core session timer.
///
/// Operates on wall-clock deltas -- no internal thread.
#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    running: Option<RunningSession>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self { running: None }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        if self.running.is_some() {
            TimerState::Running
        } else {
            TimerState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn phase(&self) -> BreathPhase {
        self.running
            .as_ref()
            .map(|r| r.phase)
            .unwrap_or(BreathPhase::Inhale)
    }

    /// Seconds elapsed in the current phase.
    pub fn phase_elapsed(&self) -> f64 {
        self.running.as_ref().map(|r| r.phase_elapsed).unwrap_or(0.0)
    }

    pub fn cycle_count(&self) -> u32 {
        self.running.as_ref().map(|r| r.cycle_count).unwrap_or(0)
    }

    pub fn session_elapsed(&self) -> f64 {
        self.running.as_ref().map(|r| r.session_elapsed).unwrap_or(0.0)
    }

    pub fn pattern(&self) -> Option<&Pattern> {
        self.running.as_ref().map(|r| &r.pattern)
    }

    pub fn remaining_secs(&self) -> f64 {
        match &self.running {
            Some(r) => (r.effective_duration(r.phase) - r.phase_elapsed).max(0.0),
            None => 0.0,
        }
    }

    pub fn phase_progress(&self) -> f64 {
        self.running.as_ref().map(|r| r.phase_progress()).unwrap_or(0.0)
    }

    pub fn scale(&self) -> f64 {
        match &self.running {
            Some(r) => breathing_scale(r.phase, r.phase_progress()),
            None => SCALE_MIN,
        }
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        let phase = self.phase();
        TimerSnapshot {
            state: self.state(),
            pattern_id: self.running.as_ref().map(|r| r.pattern.id.clone()),
            phase,
            phase_label: phase.label().to_string(),
            remaining_secs: self.remaining_secs(),
            phase_progress: self.phase_progress(),
            scale: self.scale(),
            cycle_count: self.cycle_count(),
            session_elapsed_secs: self.session_elapsed(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Begin a session at `Inhale` with all counters at zero.
    ///
    /// # Errors
    ///
    /// `AlreadyRunning` if a session is in progress, `InvalidSpeed` for a
    /// non-positive multiplier, `InvalidPattern` if one cycle would take no
    /// time.
    pub fn start(&mut self, pattern: Pattern, speed: f64, now: Instant) -> Result<Event, TimerError> {
        if self.running.is_some() {
            return Err(TimerError::AlreadyRunning);
        }
        if !speed.is_finite() || speed <= 0.0 {
            return Err(TimerError::InvalidSpeed(speed));
        }
        let phases_ok = BreathPhase::ALL.iter().all(|p| {
            let secs = resolve_phase_duration(&pattern, *p);
            secs.is_finite() && secs >= 0.0
        });
        let cycle_secs = total_pattern_duration(&pattern) * speed;
        if !phases_ok || !(cycle_secs > 0.0) {
            return Err(TimerError::InvalidPattern(pattern.id));
        }

        let mut session = RunningSession {
            pattern,
            speed,
            phase: BreathPhase::Inhale,
            phase_elapsed: 0.0,
            cycle_count: 0,
            session_elapsed: 0.0,
            last_tick: now,
            started_at: Utc::now(),
        };
        // A zero-length opening phase is never current.
        while session.effective_duration(session.phase) <= 0.0 {
            session.phase = session.phase.next();
        }

        info!(pattern = %session.pattern.id, speed, "breathing session started");
        let event = Event::SessionStarted {
            pattern_id: session.pattern.id.clone(),
            speed,
            cycle_limit: session.pattern.cycles,
            at: session.started_at,
        };
        self.running = Some(session);
        Ok(event)
    }

    /// Apply the wall-clock delta since the previous tick.
    ///
    /// Returns the events produced in the order they occurred: phase
    /// changes, completed cycles, and either a trailing `Tick` snapshot or
    /// `SessionFinished` when the cycle limit was reached (the timer is then
    /// back to idle). Ticking while idle yields nothing.
    ///
    /// # Errors
    ///
    /// `InvalidPattern` if four consecutive phases have zero duration.
    pub fn tick(&mut self, now: Instant) -> Result<Vec<Event>, TimerError> {
        let Some(session) = self.running.as_mut() else {
            return Ok(Vec::new());
        };

        let delta = now.saturating_duration_since(session.last_tick).as_secs_f64();
        session.last_tick = now;
        session.phase_elapsed += delta;
        session.session_elapsed += delta;

        let mut events = Vec::new();
        let mut zero_run = 0u8;
        loop {
            let duration = session.effective_duration(session.phase);
            if session.phase_elapsed < duration {
                break;
            }
            if duration <= 0.0 {
                zero_run += 1;
                if zero_run >= 4 {
                    return Err(TimerError::InvalidPattern(session.pattern.id.clone()));
                }
            } else {
                zero_run = 0;
            }

            // Keep the overshoot so drift does not build up across phases.
            session.phase_elapsed -= duration;
            let from = session.phase;
            session.phase = from.next();
            debug!(?from, to = ?session.phase, overshoot = session.phase_elapsed, "phase advanced");
            events.push(Event::PhaseChanged {
                from,
                to: session.phase,
                cycle_count: session.cycle_count,
                at: Utc::now(),
            });

            if from == BreathPhase::HoldAfterExhale {
                session.cycle_count += 1;
                events.push(Event::CycleCompleted {
                    cycle_count: session.cycle_count,
                    at: Utc::now(),
                });
                if session
                    .pattern
                    .cycles
                    .is_some_and(|limit| session.cycle_count >= limit)
                {
                    info!(cycles = session.cycle_count, "cycle limit reached, auto-stopping");
                    // Time past the final cycle belongs to no phase.
                    session.session_elapsed = (session.session_elapsed - session.phase_elapsed).max(0.0);
                    session.phase_elapsed = 0.0;
                    if let Some(summary) = self.stop() {
                        events.push(Event::SessionFinished {
                            summary,
                            at: Utc::now(),
                        });
                    }
                    return Ok(events);
                }
            }
        }

        events.push(Event::Tick {
            snapshot: self.snapshot(),
        });
        Ok(events)
    }

    /// End the session and return its summary.
    ///
    /// Elapsed time is what the last tick accounted for. Calling `stop()`
    /// while idle is a no-op and returns `None`.
    pub fn stop(&mut self) -> Option<SessionSummary> {
        let session = self.running.take()?;
        let summary = SessionSummary {
            pattern_id: session.pattern.id,
            started_at: session.started_at,
            elapsed_secs: session.session_elapsed,
            cycles: session.cycle_count,
        };
        info!(
            elapsed_secs = summary.elapsed_secs,
            cycles = summary.cycles,
            "breathing session stopped"
        );
        Some(summary)
    }
}
