//! Bounded, append-only log of completed breathing sessions.
//!
//! Records are kept newest first. Aggregates are computed from the log on
//! every call and never cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;
use crate::storage::{keys, load_json, save_json, KeyValueStore};

/// Maximum number of sessions retained.
pub const MAX_SESSIONS: usize = 100;

/// A completed session. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    pub cycles: u32,
    pub pattern_id: String,
}

impl SessionRecord {
    pub fn new(
        started_at: DateTime<Utc>,
        duration_secs: f64,
        cycles: u32,
        pattern_id: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at,
            duration_secs: duration_secs.max(0.0),
            cycles,
            pattern_id: pattern_id.into(),
        }
    }

    /// `m:ss` rendering of the duration.
    pub fn formatted_duration(&self) -> String {
        let total = self.duration_secs as u64;
        format!("{}:{:02}", total / 60, total % 60)
    }
}

/// Aggregate totals over the whole log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub total_sessions: u64,
    pub total_duration_secs: f64,
    pub total_cycles: u64,
    pub average_session_secs: f64,
}

#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    sessions: Vec<SessionRecord>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an existing newest-first list, keeping at most
    /// [`MAX_SESSIONS`].
    pub fn from_sessions(mut sessions: Vec<SessionRecord>) -> Self {
        sessions.truncate(MAX_SESSIONS);
        Self { sessions }
    }

    /// Load the `sessions` entry; a missing entry is an empty log.
    pub fn load(store: &dyn KeyValueStore) -> Result<Self, StorageError> {
        let sessions: Vec<SessionRecord> = load_json(store, keys::SESSIONS)?.unwrap_or_default();
        Ok(Self::from_sessions(sessions))
    }

    pub fn save(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        save_json(store, keys::SESSIONS, &self.sessions)
    }

    /// Insert at the head, evicting the oldest-inserted record when over
    /// capacity. Returns the evicted record, if any.
    pub fn append(&mut self, record: SessionRecord) -> Option<SessionRecord> {
        debug!(id = %record.id, cycles = record.cycles, "appending session");
        self.sessions.insert(0, record);
        if self.sessions.len() > MAX_SESSIONS {
            self.sessions.pop()
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    /// Newest first.
    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }

    pub fn recent(&self, n: usize) -> &[SessionRecord] {
        &self.sessions[..n.min(self.sessions.len())]
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn total_sessions(&self) -> u64 {
        self.sessions.len() as u64
    }

    pub fn total_duration(&self) -> f64 {
        self.sessions.iter().map(|s| s.duration_secs).sum()
    }

    pub fn total_cycles(&self) -> u64 {
        self.sessions.iter().map(|s| s.cycles as u64).sum()
    }

    /// 0 when the log is empty.
    pub fn average_session_duration(&self) -> f64 {
        if self.sessions.is_empty() {
            return 0.0;
        }
        self.total_duration() / self.sessions.len() as f64
    }

    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            total_sessions: self.total_sessions(),
            total_duration_secs: self.total_duration(),
            total_cycles: self.total_cycles(),
            average_session_secs: self.average_session_duration(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn record(secs: f64, cycles: u32) -> SessionRecord {
        SessionRecord::new(Utc::now(), secs, cycles, "box")
    }

    #[test]
    fn empty_history_has_zero_average() {
        let history = HistoryStore::new();
        assert_eq!(history.average_session_duration(), 0.0);
        assert_eq!(history.summary(), HistorySummary::default());
    }

    #[test]
    fn aggregates_sum_over_log() {
        let mut history = HistoryStore::new();
        history.append(record(60.0, 4));
        history.append(record(30.0, 2));

        assert_eq!(history.total_sessions(), 2);
        assert_eq!(history.total_duration(), 90.0);
        assert_eq!(history.total_cycles(), 6);
        assert_eq!(history.average_session_duration(), 45.0);
    }

    #[test]
    fn newest_record_is_first() {
        let mut history = HistoryStore::new();
        let first = record(10.0, 1);
        let second = record(20.0, 1);
        history.append(first.clone());
        history.append(second.clone());
        assert_eq!(history.sessions()[0], second);
        assert_eq!(history.recent(1), &[second]);
        assert_eq!(history.recent(10).len(), 2);
    }

    #[test]
    fn overflow_evicts_oldest_inserted() {
        let mut history = HistoryStore::new();
        let oldest = record(1.0, 1);
        history.append(oldest.clone());
        for _ in 1..MAX_SESSIONS {
            assert!(history.append(record(2.0, 1)).is_none());
        }
        assert_eq!(history.len(), MAX_SESSIONS);

        let evicted = history.append(record(3.0, 1));
        assert_eq!(evicted, Some(oldest));
        assert_eq!(history.len(), MAX_SESSIONS);
    }

    #[test]
    fn save_and_load() {
        let db = Database::open_memory().unwrap();
        let mut history = HistoryStore::new();
        history.append(record(64.0, 4));
        history.save(&db).unwrap();

        let loaded = HistoryStore::load(&db).unwrap();
        assert_eq!(loaded.sessions(), history.sessions());
    }

    #[test]
    fn formatted_duration() {
        assert_eq!(record(64.9, 4).formatted_duration(), "1:04");
    }
}
