//! Process-wide application context.
//!
//! Owns every component and runs the reactive chain when a session ends:
//!
//! ```text
//! stop / auto-stop -> append to history -> persist history
//!                  -> recompute progress -> persist achievements (if changed)
//!                  -> persist weekly stats -> refresh goals -> persist goals
//!                  -> notify -> emit events
//! ```
//!
//! The chain is synchronous. Storage failures never undo an in-memory
//! change; they are logged and handed back as warnings.

use std::path::PathBuf;
use std::time::Instant;

use chrono::{Local, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use crate::collaborators::{AudioPlayer, LogNotifier, Notifier, ReminderTime, SilentAudio};
use crate::error::{CoreError, GoalError, StorageError, TimerError, ValidationError};
use crate::events::{Event, EventBus, SubscriptionId};
use crate::goals::{Goal, GoalManager, GoalPeriod, GoalSuggestion};
use crate::history::{HistoryStore, SessionRecord};
use crate::pattern::{BreathPhase, CustomPattern, PatternCatalog};
use crate::progress::{practice_progress, Achievement, PracticeProgress, ProgressEngine, ProgressMetric, ProgressValues};
use crate::storage::{Database, KeyValueStore, Settings};
use crate::timer::{SessionSummary, SessionTimer, TimerSnapshot};

/// What a tick or stop produced.
#[derive(Debug, Default)]
pub struct SessionOutcome {
    /// Events in the order they were emitted.
    pub events: Vec<Event>,
    /// Set when a session ended and was kept.
    pub record: Option<SessionRecord>,
    /// Set when a session ended with nothing worth keeping.
    pub discarded: Option<SessionSummary>,
    pub unlocked: Vec<Achievement>,
    pub completed_goals: Vec<Goal>,
    /// Persistence failures during this call.
    pub warnings: Vec<CoreError>,
}

impl SessionOutcome {
    pub fn finished(&self) -> bool {
        self.record.is_some() || self.discarded.is_some()
    }
}

pub struct AppContext {
    store: Box<dyn KeyValueStore>,
    settings: Settings,
    settings_path: Option<PathBuf>,
    patterns: PatternCatalog,
    timer: SessionTimer,
    history: HistoryStore,
    progress: ProgressEngine,
    goals: GoalManager,
    notifier: Box<dyn Notifier>,
    audio: Box<dyn AudioPlayer>,
    bus: EventBus,
    warnings: Vec<CoreError>,
}

impl AppContext {
    /// Open the on-disk database and settings in the data directory.
    pub fn open() -> Result<Self, CoreError> {
        let settings_path = Settings::path()?;
        let settings = Settings::load_from(&settings_path)?;
        let store = Database::open()?;
        let mut ctx = Self::with_store(Box::new(store), settings)?;
        ctx.settings_path = Some(settings_path);
        Ok(ctx)
    }

    /// Context over an in-memory database with default settings. Settings
    /// changes are not written anywhere.
    pub fn in_memory() -> Result<Self, CoreError> {
        Self::with_store(Box::new(Database::open_memory()?), Settings::default())
    }

    /// Load history, achievements, weekly stats and goals from `store`.
    pub fn with_store(store: Box<dyn KeyValueStore>, settings: Settings) -> Result<Self, CoreError> {
        let history = HistoryStore::load(&*store)?;
        let mut progress = ProgressEngine::load(&*store)?;
        let goals = GoalManager::load(&*store)?;
        let patterns = PatternCatalog::with_defaults(settings.custom_patterns.clone());

        // Values must be current before goals read them. Unlocks found here
        // are persisted but not announced.
        let update = progress.recompute(&history);

        let mut ctx = Self {
            store,
            settings,
            settings_path: None,
            patterns,
            timer: SessionTimer::new(),
            history,
            progress,
            goals,
            notifier: Box::new(LogNotifier),
            audio: Box::new(SilentAudio),
            bus: EventBus::new(),
            warnings: Vec::new(),
        };
        if update.achievements_changed() {
            let result = ctx.progress.save_achievements(&*ctx.store);
            ctx.persist(result);
        }
        info!(sessions = ctx.history.len(), goals = ctx.goals.active().len(), "context loaded");
        Ok(ctx)
    }

    pub fn with_notifier(mut self, notifier: impl Notifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn with_audio(mut self, audio: impl AudioPlayer + 'static) -> Self {
        self.audio = Box::new(audio);
        self
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn patterns(&self) -> &PatternCatalog {
        &self.patterns
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.timer.snapshot()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn progress(&self) -> &ProgressEngine {
        &self.progress
    }

    pub fn goals(&self) -> &GoalManager {
        &self.goals
    }

    /// Progress values derived from history right now.
    pub fn live_values(&self) -> ProgressValues {
        ProgressValues::from_history(&self.history, &Local::now())
    }

    pub fn practice_progress(&self) -> PracticeProgress {
        practice_progress(
            self.history.sessions(),
            self.settings.daily_goal_seconds,
            self.settings.weekly_goal_seconds,
            &Local::now(),
        )
    }

    /// Drain persistence failures recorded since the last call.
    pub fn take_warnings(&mut self) -> Vec<CoreError> {
        std::mem::take(&mut self.warnings)
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + 'static) -> SubscriptionId {
        self.bus.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn on_tick(&mut self, mut callback: impl FnMut(&TimerSnapshot) + 'static) -> SubscriptionId {
        self.bus.subscribe(move |event| {
            if let Event::Tick { snapshot } = event {
                callback(snapshot);
            }
        })
    }

    pub fn on_phase_change(
        &mut self,
        mut callback: impl FnMut(BreathPhase, BreathPhase) + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(move |event| {
            if let Event::PhaseChanged { from, to, .. } = event {
                callback(*from, *to);
            }
        })
    }

    pub fn on_session_finalized(
        &mut self,
        mut callback: impl FnMut(&SessionRecord) + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(move |event| {
            if let Event::SessionFinalized { record } = event {
                callback(record);
            }
        })
    }

    pub fn on_achievement_unlocked(
        &mut self,
        mut callback: impl FnMut(&Achievement) + 'static,
    ) -> SubscriptionId {
        self.bus.subscribe(move |event| {
            if let Event::AchievementUnlocked { achievement } = event {
                callback(achievement);
            }
        })
    }

    // ── Session ──────────────────────────────────────────────────────

    /// Start a session on a built-in mode id, custom pattern id or custom
    /// pattern name, at the configured speed.
    pub fn start_session(&mut self, pattern_key: &str, now: Instant) -> Result<Event, TimerError> {
        self.start_session_at_speed(pattern_key, self.settings.speed_multiplier(), now)
    }

    /// Like [`start_session`](Self::start_session) with an explicit speed
    /// multiplier instead of the configured one.
    pub fn start_session_at_speed(
        &mut self,
        pattern_key: &str,
        speed: f64,
        now: Instant,
    ) -> Result<Event, TimerError> {
        let pattern = self
            .patterns
            .resolve(pattern_key)
            .ok_or_else(|| TimerError::UnknownPattern(pattern_key.to_string()))?;
        let event = self.timer.start(pattern, speed, now)?;

        if self.settings.sound_enabled {
            self.audio
                .play_loop(self.settings.selected_sound.sound_id(), self.settings.volume as f32);
            self.audio.play_one_shot(self.timer.phase());
        }
        self.bus.emit(&event);
        Ok(event)
    }

    /// Advance the running session. Reaching the cycle limit finalizes it.
    pub fn tick_session(&mut self, now: Instant) -> Result<SessionOutcome, TimerError> {
        let events = self.timer.tick(now)?;
        Ok(self.dispatch_tick(events))
    }

    /// Account for time up to `now`, then stop and finalize. A no-op when
    /// idle.
    pub fn stop_session(&mut self, now: Instant) -> SessionOutcome {
        let events = match self.timer.tick(now) {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "final tick failed, stopping without it");
                Vec::new()
            }
        };
        let mut outcome = self.dispatch_tick(events);
        if let Some(summary) = self.timer.stop() {
            self.audio.stop_all();
            self.finalize(summary, &mut outcome);
        }
        outcome
    }

    fn dispatch_tick(&mut self, events: Vec<Event>) -> SessionOutcome {
        let mut outcome = SessionOutcome::default();
        let mut finished = None;
        for event in events {
            match &event {
                Event::PhaseChanged { to, .. } if self.settings.sound_enabled => {
                    self.audio.play_one_shot(*to);
                }
                Event::SessionFinished { summary, .. } => finished = Some(summary.clone()),
                _ => {}
            }
            self.bus.emit(&event);
            outcome.events.push(event);
        }
        if let Some(summary) = finished {
            self.audio.stop_all();
            self.finalize(summary, &mut outcome);
        }
        outcome
    }

    fn finalize(&mut self, summary: SessionSummary, outcome: &mut SessionOutcome) {
        match summary.clone().into_record() {
            Some(record) => {
                let recorded = self.record_session(record);
                outcome.events.extend(recorded.events);
                outcome.record = recorded.record;
                outcome.unlocked = recorded.unlocked;
                outcome.completed_goals = recorded.completed_goals;
                outcome.warnings.extend(recorded.warnings);
            }
            None => {
                info!(cycles = summary.cycles, elapsed = summary.elapsed_secs, "session discarded");
                let event = Event::SessionDiscarded {
                    summary: summary.clone(),
                };
                self.bus.emit(&event);
                outcome.events.push(event);
                outcome.discarded = Some(summary);
            }
        }
    }

    /// Append a finished session and run the derivation chain.
    pub fn record_session(&mut self, record: SessionRecord) -> SessionOutcome {
        info!(id = %record.id, duration = record.duration_secs, cycles = record.cycles, "session finalized");
        self.history.append(record.clone());
        let result = self.history.save(&*self.store);
        self.persist(result);

        let update = self.progress.recompute(&self.history);
        if update.achievements_changed() {
            let result = self.progress.save_achievements(&*self.store);
            self.persist(result);
        }
        let result = self.progress.save_weekly_stats(&*self.store);
        self.persist(result);

        let mut completed_goals = self.goals.refresh_from(&update.values);
        completed_goals.extend(self.goals.add_practice(record.duration_secs, record.started_at));
        let result = self.goals.save(&*self.store);
        self.persist(result);

        for achievement in &update.unlocked {
            self.notifier.notify_achievement_unlocked(achievement);
        }

        let mut events = vec![Event::SessionFinalized {
            record: record.clone(),
        }];
        events.extend(update.unlocked.iter().map(|a| Event::AchievementUnlocked {
            achievement: a.clone(),
        }));
        events.extend(completed_goals.iter().map(|g| Event::GoalCompleted { goal: g.clone() }));
        self.bus.emit_all(&events);

        SessionOutcome {
            events,
            record: Some(record),
            discarded: None,
            unlocked: update.unlocked,
            completed_goals,
            warnings: self.take_warnings(),
        }
    }

    // ── History and progress ─────────────────────────────────────────

    /// Empty the history. Unlocked achievements and goal progress stay.
    pub fn clear_history(&mut self) {
        self.history.clear();
        let result = self.history.save(&*self.store);
        self.persist(result);

        let update = self.progress.recompute(&self.history);
        let result = self.progress.save_weekly_stats(&*self.store);
        self.persist(result);
        self.goals.refresh_from(&update.values);

        info!("history cleared");
        self.bus.emit(&Event::HistoryCleared { at: Utc::now() });
    }

    /// Relock achievements, drop all goals and empty the weekly map.
    pub fn reset_progress(&mut self) {
        self.progress.reset_achievements();
        self.progress.reset_weekly_stats();
        self.goals.reset_all();

        let result = self.progress.save_achievements(&*self.store);
        self.persist(result);
        let result = self.progress.save_weekly_stats(&*self.store);
        self.persist(result);
        let result = self.goals.save(&*self.store);
        self.persist(result);
        info!("progress reset");
    }

    // ── Goals ────────────────────────────────────────────────────────

    pub fn create_goal(
        &mut self,
        title: &str,
        target_secs: f64,
        period: GoalPeriod,
    ) -> Result<Goal, ValidationError> {
        let goal = self.goals.create_goal(title, target_secs, period, Utc::now())?;
        self.save_goals();
        Ok(goal)
    }

    pub fn create_metric_goal(
        &mut self,
        metric: ProgressMetric,
        target_value: u64,
        days: u32,
    ) -> Result<Goal, ValidationError> {
        let values = self.live_values();
        let goal = self
            .goals
            .create_metric_goal(metric, target_value, days, &values, Utc::now())?;
        self.save_goals();
        if !goal.is_active {
            self.bus.emit(&Event::GoalCompleted { goal: goal.clone() });
        }
        Ok(goal)
    }

    pub fn adopt_suggestion(&mut self, suggestion: &GoalSuggestion) -> Result<Goal, ValidationError> {
        let goal = self.goals.adopt(suggestion, Utc::now())?;
        self.save_goals();
        Ok(goal)
    }

    pub fn update_goal_progress(&mut self, id: Uuid, delta: f64) -> Result<Option<Goal>, GoalError> {
        let completed = self.goals.update_progress(id, delta)?;
        self.save_goals();
        if let Some(goal) = &completed {
            self.bus.emit(&Event::GoalCompleted { goal: goal.clone() });
        }
        Ok(completed)
    }

    pub fn delete_goal(&mut self, id: Uuid) -> bool {
        let deleted = self.goals.delete(id);
        if deleted {
            self.save_goals();
        }
        deleted
    }

    pub fn reset_goal(&mut self, id: Uuid) -> Result<Goal, GoalError> {
        let goal = self.goals.reset(id, Utc::now())?;
        self.save_goals();
        Ok(goal)
    }

    fn save_goals(&mut self) {
        let result = self.goals.save(&*self.store);
        self.persist(result);
    }

    // ── Patterns ─────────────────────────────────────────────────────

    pub fn add_pattern(&mut self, pattern: CustomPattern) -> Result<(), ValidationError> {
        self.patterns.add(pattern)?;
        self.save_patterns();
        Ok(())
    }

    pub fn update_pattern(&mut self, pattern: CustomPattern) -> Result<bool, ValidationError> {
        let updated = self.patterns.update(pattern)?;
        if updated {
            self.save_patterns();
        }
        Ok(updated)
    }

    pub fn delete_pattern(&mut self, id: Uuid) -> bool {
        let deleted = self.patterns.delete(id);
        if deleted {
            self.save_patterns();
        }
        deleted
    }

    pub fn toggle_favorite(&mut self, id: Uuid) -> Option<bool> {
        let favorite = self.patterns.toggle_favorite(id)?;
        self.save_patterns();
        Some(favorite)
    }

    pub fn seed_patterns(&mut self) -> usize {
        let added = self.patterns.seed_predefined();
        if added > 0 {
            self.save_patterns();
        }
        added
    }

    fn save_patterns(&mut self) {
        self.settings.custom_patterns = self.patterns.custom().to_vec();
        self.save_settings();
    }

    // ── Settings and reminders ───────────────────────────────────────

    /// Replace the settings after validating them.
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), CoreError> {
        settings.validate()?;
        self.settings = settings;
        self.save_settings();
        Ok(())
    }

    pub fn set_reminder(&mut self, time: ReminderTime) -> Result<(), ValidationError> {
        time.validate()?;
        self.settings.reminder = Some(time);
        self.notifier.schedule_daily_reminder(time);
        self.save_settings();
        Ok(())
    }

    pub fn cancel_reminder(&mut self) {
        self.settings.reminder = None;
        self.notifier.cancel_daily_reminder();
        self.save_settings();
    }

    fn save_settings(&mut self) {
        let Some(path) = &self.settings_path else {
            return;
        };
        if let Err(e) = self.settings.save_to(path) {
            warn!(error = %e, "failed to save settings");
            self.warnings.push(e.into());
        }
    }

    fn persist(&mut self, result: Result<(), StorageError>) {
        if let Err(e) = result {
            warn!(error = %e, "storage write failed, keeping in-memory state");
            self.warnings.push(e.into());
        }
    }
}
