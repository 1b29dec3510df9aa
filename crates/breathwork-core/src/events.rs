use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::goals::Goal;
use crate::history::SessionRecord;
use crate::pattern::BreathPhase;
use crate::progress::Achievement;
use crate::timer::{SessionSummary, TimerSnapshot};

/// Every state change in a session or in derived progress produces an Event.
/// Front ends subscribe to them through the [`EventBus`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    SessionStarted {
        pattern_id: String,
        speed: f64,
        cycle_limit: Option<u32>,
        at: DateTime<Utc>,
    },
    /// Observable timer state after a tick that did not end the session.
    Tick {
        snapshot: TimerSnapshot,
    },
    PhaseChanged {
        from: BreathPhase,
        to: BreathPhase,
        cycle_count: u32,
        at: DateTime<Utc>,
    },
    CycleCompleted {
        cycle_count: u32,
        at: DateTime<Utc>,
    },
    /// The cycle limit was reached and the timer stopped itself.
    SessionFinished {
        summary: SessionSummary,
        at: DateTime<Utc>,
    },
    /// A stopped session was kept and appended to history.
    SessionFinalized {
        record: SessionRecord,
    },
    /// A stopped session had no completed cycle or no elapsed time.
    SessionDiscarded {
        summary: SessionSummary,
    },
    AchievementUnlocked {
        achievement: Achievement,
    },
    GoalCompleted {
        goal: Goal,
    },
    HistoryCleared {
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short machine name, matching the serialized `type` tag.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::SessionStarted { .. } => "SessionStarted",
            Event::Tick { .. } => "Tick",
            Event::PhaseChanged { .. } => "PhaseChanged",
            Event::CycleCompleted { .. } => "CycleCompleted",
            Event::SessionFinished { .. } => "SessionFinished",
            Event::SessionFinalized { .. } => "SessionFinalized",
            Event::SessionDiscarded { .. } => "SessionDiscarded",
            Event::AchievementUnlocked { .. } => "AchievementUnlocked",
            Event::GoalCompleted { .. } => "GoalCompleted",
            Event::HistoryCleared { .. } => "HistoryCleared",
        }
    }
}

type Subscriber = Box<dyn FnMut(&Event)>;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

/// Synchronous fan-out of events to subscribers.
///
/// Subscribers run on the caller's thread, in subscription order, for each
/// event in emission order.
#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&Event) + 'static) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: &Event) {
        for (_, subscriber) in self.subscribers.iter_mut() {
            subscriber(event);
        }
    }

    pub fn emit_all<'a>(&mut self, events: impl IntoIterator<Item = &'a Event>) {
        for event in events {
            self.emit(event);
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}
