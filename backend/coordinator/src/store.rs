//! Persisted last-known reading, surviving service restarts.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

/// The slice of publisher state worth keeping across restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub last_value: f64,
    pub last_reading: DateTime<Utc>,
}

/// JSON file store for [`PersistedState`], written atomically after every
/// successful cycle.
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the persisted state, if any. A missing or corrupt file only
    /// logs; the service then starts unseeded.
    pub async fn load(&self) -> Option<PersistedState> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(_) => {
                debug!(path = %self.path.display(), "No persisted state");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(state) => Some(state),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Could not restore persisted state");
                None
            }
        }
    }

    /// Write the state to a temp file, then rename into place.
    pub async fn save(&self, state: &PersistedState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create state directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(state)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, json.as_bytes())
            .await
            .with_context(|| format!("Failed to write temp state: {}", tmp_path.display()))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .with_context(|| format!("Failed to rename temp state to: {}", self.path.display()))?;

        debug!(path = %self.path.display(), value = state.last_value, "Persisted state");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("meterwatch-store-{tag}-{}.json", std::process::id()))
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let path = temp_path("roundtrip");
        let store = StateStore::new(&path);
        let state = PersistedState {
            last_value: 87.18,
            last_reading: Utc::now(),
        };
        store.save(&state).await.unwrap();

        let restored = store.load().await.unwrap();
        assert_eq!(restored.last_value, 87.18);

        let _ = fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn missing_file_loads_as_none() {
        let store = StateStore::new(temp_path("missing-nonexistent"));
        assert!(store.load().await.is_none());
    }

    #[tokio::test]
    async fn corrupt_file_loads_as_none() {
        let path = temp_path("corrupt");
        fs::write(&path, "{not json").await.unwrap();
        let store = StateStore::new(&path);
        assert!(store.load().await.is_none());
        let _ = fs::remove_file(&path).await;
    }
}
