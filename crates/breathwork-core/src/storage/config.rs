//! TOML-based user settings.
//!
//! Stores user preferences including:
//! - Sound, haptic and vibration toggles and volume
//! - Background sound and theme selection
//! - Breathing speed
//! - Daily and weekly practice goals
//! - Custom breathing patterns
//! - Daily reminder time
//!
//! Settings are stored at `<data dir>/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::collaborators::ReminderTime;
use crate::error::ConfigError;
use crate::pattern::CustomPattern;

/// Background sounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathingSound {
    Nature,
    Ocean,
    Rain,
    Forest,
    WhiteNoise,
    Meditation,
}

impl BreathingSound {
    /// File stem handed to the audio player.
    pub fn sound_id(self) -> &'static str {
        match self {
            BreathingSound::Nature => "nature_ambient",
            BreathingSound::Ocean => "ocean_waves",
            BreathingSound::Rain => "rain_ambient",
            BreathingSound::Forest => "forest_ambient",
            BreathingSound::WhiteNoise => "white_noise",
            BreathingSound::Meditation => "meditation_bells",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppTheme {
    Calm,
    Energize,
    Focus,
    Sleep,
    Custom,
}

/// Breathing pace. The multiplier scales every phase duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreathingSpeed {
    Slow,
    Normal,
    Fast,
}

impl BreathingSpeed {
    pub fn multiplier(self) -> f64 {
        match self {
            BreathingSpeed::Slow => 1.5,
            BreathingSpeed::Normal => 1.0,
            BreathingSpeed::Fast => 0.7,
        }
    }
}

/// Application settings.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default = "default_true")]
    pub haptic_enabled: bool,
    #[serde(default = "default_true")]
    pub vibration_enabled: bool,
    /// 0.0 ..= 1.0
    #[serde(default = "default_volume")]
    pub volume: f64,
    #[serde(default = "default_sound")]
    pub selected_sound: BreathingSound,
    #[serde(default = "default_theme")]
    pub selected_theme: AppTheme,
    #[serde(default = "default_speed")]
    pub speed: BreathingSpeed,
    #[serde(default = "default_daily_goal")]
    pub daily_goal_seconds: u64,
    #[serde(default = "default_weekly_goal")]
    pub weekly_goal_seconds: u64,
    #[serde(default = "default_true")]
    pub show_breathing_guide: bool,
    #[serde(default)]
    pub auto_start_next_session: bool,
    #[serde(default)]
    pub reminder: Option<ReminderTime>,
    #[serde(default)]
    pub custom_patterns: Vec<CustomPattern>,
}

// Default functions
fn default_true() -> bool {
    true
}
fn default_volume() -> f64 {
    0.7
}
fn default_sound() -> BreathingSound {
    BreathingSound::Nature
}
fn default_theme() -> AppTheme {
    AppTheme::Calm
}
fn default_speed() -> BreathingSpeed {
    BreathingSpeed::Normal
}
fn default_daily_goal() -> u64 {
    300
}
fn default_weekly_goal() -> u64 {
    2100
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sound_enabled: true,
            haptic_enabled: true,
            vibration_enabled: true,
            volume: default_volume(),
            selected_sound: default_sound(),
            selected_theme: default_theme(),
            speed: default_speed(),
            daily_goal_seconds: default_daily_goal(),
            weekly_goal_seconds: default_weekly_goal(),
            show_breathing_guide: true,
            auto_start_next_session: false,
            reminder: None,
            custom_patterns: Vec::new(),
        }
    }
}

impl Settings {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Path of the settings file in the data directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("config.toml"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the data directory, writing defaults when missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed, or if the
    /// default settings cannot be written.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let settings: Settings = toml::from_str(&content)
                    .map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
                settings.validate()?;
                Ok(settings)
            }
            Err(_) => {
                let settings = Self::default();
                settings.save_to(path)?;
                Ok(settings)
            }
        }
    }

    /// Persist to the data directory.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Range checks that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            return Err(ConfigError::InvalidValue {
                key: "volume".into(),
                message: format!("{} is outside [0, 1]", self.volume),
            });
        }
        if let Some(reminder) = self.reminder {
            reminder.validate().map_err(|e| ConfigError::InvalidValue {
                key: "reminder".into(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }

    /// Get a settings value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by key. Unknown keys and out-of-range values are rejected
    /// and leave the settings untouched.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Settings = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn speed_multiplier(&self) -> f64 {
        self.speed.multiplier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::PhaseDurations;

    #[test]
    fn default_settings_roundtrip() {
        let mut settings = Settings::default();
        settings.custom_patterns.push(
            CustomPattern::new("Calm", "", PhaseDurations::new(4.0, 0.0, 6.0, 0.0), 5).unwrap(),
        );
        settings.reminder = Some(ReminderTime { hour: 8, minute: 30 });
        let toml_str = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, settings);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: Settings = toml::from_str("").unwrap();
        assert_eq!(parsed, Settings::default());
    }

    #[test]
    fn default_values() {
        let settings = Settings::default();
        assert!(settings.sound_enabled);
        assert_eq!(settings.volume, 0.7);
        assert_eq!(settings.speed, BreathingSpeed::Normal);
        assert_eq!(settings.daily_goal_seconds, 300);
        assert_eq!(settings.weekly_goal_seconds, 2100);
        assert_eq!(settings.selected_sound.sound_id(), "nature_ambient");
    }

    #[test]
    fn speed_multipliers() {
        assert_eq!(BreathingSpeed::Slow.multiplier(), 1.5);
        assert_eq!(BreathingSpeed::Normal.multiplier(), 1.0);
        assert_eq!(BreathingSpeed::Fast.multiplier(), 0.7);
    }

    #[test]
    fn get_supports_keys() {
        let settings = Settings::default();
        assert_eq!(settings.get("sound_enabled").as_deref(), Some("true"));
        assert_eq!(settings.get("speed").as_deref(), Some("normal"));
        assert_eq!(settings.get("daily_goal_seconds").as_deref(), Some("300"));
        assert!(settings.get("missing_key").is_none());
    }

    #[test]
    fn set_updates_typed_values() {
        let mut settings = Settings::default();
        settings.set("sound_enabled", "false").unwrap();
        settings.set("volume", "0.25").unwrap();
        settings.set("speed", "fast").unwrap();
        settings.set("selected_sound", "white_noise").unwrap();
        assert!(!settings.sound_enabled);
        assert_eq!(settings.volume, 0.25);
        assert_eq!(settings.speed, BreathingSpeed::Fast);
        assert_eq!(settings.selected_sound, BreathingSound::WhiteNoise);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut settings = Settings::default();
        let err = settings.set("nonexistent_key", "value").unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(_)));
    }

    #[test]
    fn set_rejects_out_of_range_volume() {
        let mut settings = Settings::default();
        assert!(settings.set("volume", "1.5").is_err());
        assert_eq!(settings.volume, 0.7);
    }

    #[test]
    fn validate_rejects_bad_reminder() {
        let mut settings = Settings::default();
        settings.reminder = Some(ReminderTime { hour: 25, minute: 0 });
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "reminder"
        ));
    }

    #[test]
    fn set_rejects_invalid_enum_and_type() {
        let mut settings = Settings::default();
        assert!(settings.set("speed", "warp").is_err());
        assert!(settings.set("sound_enabled", "not_a_bool").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_from_writes_defaults_then_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(path.exists());

        let mut changed = settings.clone();
        changed.daily_goal_seconds = 600;
        changed.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap().daily_goal_seconds, 600);
    }

    #[test]
    fn load_from_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "volume = [").unwrap();
        assert!(matches!(
            Settings::load_from(&path),
            Err(ConfigError::ParseFailed(_))
        ));
    }
}
