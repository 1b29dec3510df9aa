//! Outbound collaborators: notifications and audio.
//!
//! The core only calls these traits; platform front ends provide the real
//! implementations. The defaults here log or do nothing.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ValidationError;
use crate::pattern::BreathPhase;
use crate::progress::Achievement;

/// Local time of day for the daily reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderTime {
    pub hour: u32,
    pub minute: u32,
}

impl ReminderTime {
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        let time = Self { hour, minute };
        time.validate()?;
        Ok(time)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hour > 23 {
            return Err(ValidationError::OutOfBounds {
                field: "hour".into(),
                value: self.hour as f64,
                min: 0.0,
                max: 23.0,
            });
        }
        if self.minute > 59 {
            return Err(ValidationError::OutOfBounds {
                field: "minute".into(),
                value: self.minute as f64,
                min: 0.0,
                max: 59.0,
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for ReminderTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

pub trait Notifier {
    fn notify_achievement_unlocked(&mut self, achievement: &Achievement);
    fn schedule_daily_reminder(&mut self, time: ReminderTime);
    fn cancel_daily_reminder(&mut self);
}

pub trait AudioPlayer {
    /// Start the background loop for a sound file stem.
    fn play_loop(&mut self, sound_id: &str, volume: f32);
    /// Cue for entering a phase.
    fn play_one_shot(&mut self, phase: BreathPhase);
    fn stop_all(&mut self);
}

/// Notifier that only writes to the log.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify_achievement_unlocked(&mut self, achievement: &Achievement) {
        info!(id = %achievement.id, title = %achievement.title, "achievement notification");
    }

    fn schedule_daily_reminder(&mut self, time: ReminderTime) {
        info!(%time, "daily reminder scheduled");
    }

    fn cancel_daily_reminder(&mut self) {
        info!("daily reminder cancelled");
    }
}

#[derive(Debug, Default)]
pub struct SilentAudio;

impl AudioPlayer for SilentAudio {
    fn play_loop(&mut self, sound_id: &str, volume: f32) {
        debug!(sound_id, volume, "play loop (silent)");
    }

    fn play_one_shot(&mut self, phase: BreathPhase) {
        debug!(sound = phase.sound_id(), "play cue (silent)");
    }

    fn stop_all(&mut self) {}
}
