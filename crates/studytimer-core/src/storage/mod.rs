mod config;
pub mod database;
mod memory;

pub use config::{Config, NotificationsConfig};
pub use database::Database;
pub use memory::MemoryStore;

use std::path::PathBuf;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Result, StorageError};

/// Storage key for the saved [`UserProfile`](crate::profile::UserProfile).
pub const PROFILE_KEY: &str = "userProfile";
/// Storage key for the saved [`TimerState`](crate::timer::TimerState).
pub const TIMER_KEY: &str = "studyTimer";
/// Storage key for the saved [`StudyStats`](crate::stats::StudyStats).
pub const STATS_KEY: &str = "studyStats";
/// Storage key for the saved deadline list.
pub const DEADLINES_KEY: &str = "studyDeadlines";

/// Durable string key-value store.
///
/// Each key is written independently; there is no multi-key transaction.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

/// Read and decode a JSON value. `Ok(None)` when the key is absent.
///
/// # Errors
/// Returns an error if the store fails or the stored text is not valid
/// JSON for `T`.
pub fn load_json<T: DeserializeOwned>(store: &impl KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Encode a value as JSON and overwrite `key`.
///
/// # Errors
/// Returns an error if serialization or the write fails.
pub fn save_json<T: Serialize + ?Sized>(store: &impl KeyValueStore, key: &str, value: &T) -> Result<()> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)?;
    Ok(())
}

/// Returns the data directory, creating it if needed.
///
/// `STUDYTIMER_DATA_DIR` wins when set. Otherwise `~/.config/studytimer`,
/// or `~/.config/studytimer-dev` with `STUDYTIMER_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("STUDYTIMER_DATA_DIR") {
        Some(custom) if !custom.is_empty() => PathBuf::from(custom),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("STUDYTIMER_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("studytimer-dev")
            } else {
                base_dir.join("studytimer")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
