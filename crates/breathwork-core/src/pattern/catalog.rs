//! Built-in modes plus the user-extensible set of custom patterns.

use tracing::debug;
use uuid::Uuid;

use super::breathing::{BreathingMode, Pattern};
use super::custom::{predefined, CustomPattern};
use crate::error::ValidationError;

/// Pattern catalog.
///
/// Built-in modes are fixed; custom patterns are owned here and persisted
/// through [`Settings::custom_patterns`](crate::storage::Settings).
#[derive(Debug, Clone, Default)]
pub struct PatternCatalog {
    custom: Vec<CustomPattern>,
}

impl PatternCatalog {
    pub fn new(custom: Vec<CustomPattern>) -> Self {
        Self { custom }
    }

    /// Catalog with the predefined patterns when `custom` is empty.
    pub fn with_defaults(custom: Vec<CustomPattern>) -> Self {
        let mut catalog = Self::new(custom);
        if catalog.custom.is_empty() {
            catalog.seed_predefined();
        }
        catalog
    }

    /// Resolve a pattern by built-in id, custom uuid or custom name
    /// (case-insensitive).
    pub fn resolve(&self, key: &str) -> Option<Pattern> {
        if let Some(mode) = BreathingMode::from_id(key) {
            return Some(mode.pattern());
        }
        self.find_custom(key).map(CustomPattern::to_pattern)
    }

    pub fn find_custom(&self, key: &str) -> Option<&CustomPattern> {
        if let Ok(id) = Uuid::parse_str(key) {
            if let Some(found) = self.custom.iter().find(|p| p.id == id) {
                return Some(found);
            }
        }
        self.custom
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(key))
    }

    pub fn builtins(&self) -> Vec<Pattern> {
        BreathingMode::ALL.iter().map(|m| m.pattern()).collect()
    }

    pub fn custom(&self) -> &[CustomPattern] {
        &self.custom
    }

    pub fn favorites(&self) -> Vec<&CustomPattern> {
        self.custom.iter().filter(|p| p.is_favorite).collect()
    }

    pub fn add(&mut self, pattern: CustomPattern) -> Result<(), ValidationError> {
        pattern.validate()?;
        debug!(name = %pattern.name, "adding custom pattern");
        self.custom.push(pattern);
        Ok(())
    }

    /// Replace the pattern with the same id. Returns `false` if absent.
    pub fn update(&mut self, pattern: CustomPattern) -> Result<bool, ValidationError> {
        pattern.validate()?;
        match self.custom.iter_mut().find(|p| p.id == pattern.id) {
            Some(slot) => {
                *slot = pattern;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.custom.len();
        self.custom.retain(|p| p.id != id);
        self.custom.len() != before
    }

    /// Flip the favourite flag, returning the new value.
    pub fn toggle_favorite(&mut self, id: Uuid) -> Option<bool> {
        let pattern = self.custom.iter_mut().find(|p| p.id == id)?;
        pattern.is_favorite = !pattern.is_favorite;
        Some(pattern.is_favorite)
    }

    /// Add predefined patterns whose names are not taken yet.
    /// Returns the number added.
    pub fn seed_predefined(&mut self) -> usize {
        let mut added = 0;
        for (name, description, durations, cycles) in predefined() {
            if self.custom.iter().any(|p| p.name == name) {
                continue;
            }
            if let Ok(pattern) = CustomPattern::new(name, description, durations, cycles) {
                self.custom.push(pattern);
                added += 1;
            }
        }
        added
    }

    /// Case-insensitive match on name or description; empty query returns all.
    pub fn search(&self, query: &str) -> Vec<&CustomPattern> {
        if query.is_empty() {
            return self.custom.iter().collect();
        }
        let needle = query.to_lowercase();
        self.custom
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.description.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Patterns whose whole-session time lies within `[min_secs, max_secs]`.
    pub fn by_session_time(&self, min_secs: f64, max_secs: f64) -> Vec<&CustomPattern> {
        self.custom
            .iter()
            .filter(|p| {
                let total = p.total_session_secs();
                total >= min_secs && total <= max_secs
            })
            .collect()
    }

    /// Easiest first.
    pub fn by_difficulty(&self) -> Vec<&CustomPattern> {
        let mut sorted: Vec<&CustomPattern> = self.custom.iter().collect();
        sorted.sort_by(|a, b| a.difficulty_score().total_cmp(&b.difficulty_score()));
        sorted
    }
}
