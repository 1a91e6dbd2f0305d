//! Persistence of the logging destination across restarts.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serenity::model::id::ChannelId;
use tracing::{debug, warn};

use crate::common::StoreError;

/// On-disk shape of the state file.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PersistedState {
    #[serde(default)]
    pub logger_channel: Option<u64>,
}

/// Reads and writes the single persisted logger channel id.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored channel id, if any. Missing or unreadable state is not an error.
    pub fn load(&self) -> Option<ChannelId> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No state at {}: {}", self.path.display(), e);
                return None;
            }
        };

        let state: PersistedState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                warn!(
                    "Ignoring malformed state file {}: {}",
                    self.path.display(),
                    e
                );
                return None;
            }
        };

        state.logger_channel.filter(|id| *id != 0).map(ChannelId::new)
    }

    /// Overwrite the state file. Written to a sibling temp file first, then renamed.
    pub fn save(&self, channel: Option<ChannelId>) -> Result<(), StoreError> {
        let state = PersistedState {
            logger_channel: channel.map(|c| c.get()),
        };
        let json = serde_json::to_string_pretty(&state)?;

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, json).map_err(|source| StoreError::Write {
            path: temp_path.clone(),
            source,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })?;

        debug!("Saved logger channel {:?} to {}", channel, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> StateStore {
        StateStore::new(dir.path().join("config.json"))
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load(), None);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(Some(ChannelId::new(4242))).unwrap();
        assert_eq!(store.load(), Some(ChannelId::new(4242)));

        let raw = fs::read_to_string(store.path()).unwrap();
        let state: PersistedState = serde_json::from_str(&raw).unwrap();
        assert_eq!(state.logger_channel, Some(4242));
        assert!(!store.path().with_extension("tmp").exists());
    }

    #[test]
    fn test_save_none_writes_null() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.save(Some(ChannelId::new(1))).unwrap();
        store.save(None).unwrap();

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("null"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_corrupt_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{ not json").unwrap();

        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_zero_id_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), r#"{"logger_channel": 0}"#).unwrap();

        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(store.path(), "{}").unwrap();

        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_save_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let store = StateStore::new(dir.path().join("nope").join("config.json"));

        let err = store.save(None).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }));
    }
}
