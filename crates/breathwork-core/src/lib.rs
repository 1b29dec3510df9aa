//! # Breathwork Core Library
//!
//! Core logic for a guided breathing practice: the phase timer, session
//! history and everything derived from it. The `breathwork` CLI and any
//! GUI front end are thin layers over this crate.
//!
//! ## Architecture
//!
//! - **Session Timer**: A wall-clock-based phase state machine. The caller
//!   invokes `tick()` with the current instant; overshoot carries into the
//!   next phase
//! - **History**: Bounded, newest-first log of finished sessions
//! - **Progress**: Achievements, streaks and weekly activity, recomputed
//!   from history after every change
//! - **Goals**: Practice-time and metric goals with an active and a
//!   completed set
//! - **Storage**: SQLite key/value persistence and TOML settings
//!
//! ## Key Components
//!
//! - [`SessionTimer`]: Phase state machine
//! - [`AppContext`]: Owns all components and runs the finalize chain
//! - [`Database`]: Key/value persistence
//! - [`Settings`]: User preferences

pub mod collaborators;
pub mod context;
pub mod error;
pub mod events;
pub mod goals;
pub mod history;
pub mod pattern;
pub mod progress;
pub mod storage;
pub mod timer;

pub use collaborators::{AudioPlayer, LogNotifier, Notifier, ReminderTime, SilentAudio};
pub use context::{AppContext, SessionOutcome};
pub use error::{ConfigError, CoreError, GoalError, StorageError, TimerError, ValidationError};
pub use events::{Event, EventBus, SubscriptionId};
pub use goals::{Goal, GoalManager, GoalPeriod, GoalSpan, GoalStatus, GoalSuggestion};
pub use history::{HistoryStore, HistorySummary, SessionRecord, MAX_SESSIONS};
pub use pattern::{BreathPhase, BreathingMode, CustomPattern, DifficultyLevel, Pattern, PatternCatalog, PhaseDurations};
pub use progress::{Achievement, PracticeProgress, ProgressEngine, ProgressMetric, ProgressValues, WeeklyStats};
pub use storage::{Database, KeyValueStore, Settings};
pub use timer::{SessionSummary, SessionTimer, TimerSnapshot, TimerState};
