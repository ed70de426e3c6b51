//! Persistence gateway.
//!
//! App state is persisted as whole JSON snapshots behind the
//! [`SnapshotStore`] trait, one opaque string value per key. The default
//! backend writes `<key>.json` files under the data directory; tests use
//! an in-memory map. Loading is forgiving (a corrupt snapshot falls back
//! to defaults) and saving is best-effort (a failed write is logged and
//! retried on the next mutation).

mod config;

pub use config::Config;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::error::{CoreError, StorageError};

pub const POMODORO_KEY: &str = "pomodoro";
pub const HABITS_KEY: &str = "habits";

/// Returns `~/.config/habitflow[-dev]/` based on HABITFLOW_ENV.
///
/// Set HABITFLOW_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if the home directory cannot be determined or if
/// creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, CoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("HABITFLOW_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("habitflow-dev")
    } else {
        base_dir.join("habitflow")
    };

    std::fs::create_dir_all(&dir).map_err(|e| {
        StorageError::Unavailable(format!("cannot create {}: {e}", dir.display()))
    })?;
    Ok(dir)
}

/// Opaque key/value snapshot storage.
///
/// Keys are short identifiers like [`POMODORO_KEY`]; values are whole
/// serialized snapshots. `load` distinguishes "not there yet" (`Ok(None)`)
/// from an actual read failure.
pub trait SnapshotStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

/// File-backed store: one `<key>.json` file per key under `dir`.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the default data directory.
    pub fn open_default() -> Result<Self, CoreError> {
        Ok(Self::new(data_dir()?))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadFailed {
                key: key.to_string(),
                path,
                source: e,
            }),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        std::fs::write(&path, value).map_err(|e| StorageError::WriteFailed {
            key: key.to_string(),
            path,
            source: e,
        })
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::RemoveFailed {
                key: key.to_string(),
                source: e,
            }),
        }
    }
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl SnapshotStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Unavailable("memory store poisoned".into()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Load a snapshot, falling back to `T::default()` when it is missing,
/// unreadable or corrupt. Corruption is logged, never fatal: the previous
/// snapshot stays on disk until the next successful save replaces it.
pub fn load_or_default<T>(store: &dyn SnapshotStore, key: &str) -> T
where
    T: DeserializeOwned + Default,
{
    match store.load(key) {
        Ok(Some(content)) => match serde_json::from_str(&content) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "snapshot corrupt, starting from defaults");
                T::default()
            }
        },
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "snapshot unreadable, starting from defaults");
            T::default()
        }
    }
}

/// Persist a snapshot, swallowing failures. A failed save is logged and
/// the state stays live in memory; the next mutation retries. Returns
/// whether the write landed.
pub fn save_best_effort<T>(store: &mut dyn SnapshotStore, key: &str, value: &T) -> bool
where
    T: Serialize,
{
    let serialized = match serde_json::to_string(value) {
        Ok(s) => s,
        Err(e) => {
            warn!(key, error = %e, "snapshot serialization failed");
            return false;
        }
    };
    match store.save(key, &serialized) {
        Ok(()) => true,
        Err(e) => {
            warn!(key, error = %e, "snapshot save failed, will retry on next change");
            false
        }
    }
}

/// Pretty JSON rendition of a snapshot, for `data export`.
pub fn export_text<T: Serialize>(value: &T) -> Result<String, CoreError> {
    Ok(serde_json::to_string_pretty(value)?)
}
