mod config;
pub mod database;

pub use config::{AppTheme, BreathingSound, BreathingSpeed, Settings};
pub use database::Database;

use std::path::PathBuf;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::StorageError;

/// Logical keys of the persisted state.
pub mod keys {
    pub const SESSIONS: &str = "sessions";
    pub const ACHIEVEMENTS: &str = "achievements";
    pub const GOALS_ACTIVE: &str = "goals_active";
    pub const GOALS_COMPLETED: &str = "goals_completed";
    pub const WEEKLY_STATS: &str = "weekly_stats";
}

/// Byte-oriented key/value persistence.
///
/// No transactions across keys are required; each `set` replaces the whole
/// value for its key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Read and decode a JSON value.
///
/// A value that no longer decodes is logged and treated as absent so a
/// schema change never blocks start-up.
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    let Some(bytes) = store.get(key)? else {
        return Ok(None);
    };
    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(source) => {
            warn!(key, error = %source, "discarding undecodable stored value");
            Ok(None)
        }
    }
}

/// Encode a value as JSON and store it.
pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec(value).map_err(|source| StorageError::Encode {
        key: key.to_string(),
        source,
    })?;
    store.set(key, &bytes)
}

/// Returns the data directory, creating it if needed.
///
/// `BREATHWORK_DATA_DIR` overrides the location. Otherwise it is
/// `~/.config/breathwork`, or `~/.config/breathwork-dev` when
/// `BREATHWORK_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("BREATHWORK_DATA_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BREATHWORK_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("breathwork-dev")
            } else {
                base_dir.join("breathwork")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StorageError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
