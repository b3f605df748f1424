//! Observable state derived from the latest read result.
//!
//! Owns the last-known-good value: seeded once from the persisted store at
//! startup, updated only by successful cycles, never overwritten by a
//! failed one.

use chrono::Local;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{info, warn};

use meterwatch_core::ReadResult;

use crate::store::{PersistedState, StateStore};

/// Static attributes published alongside the reading for diagnosis.
#[derive(Debug, Clone)]
pub struct MeterInfo {
    pub camera: String,
    pub led: Option<String>,
    pub led_delay_seconds: u64,
    pub poll_interval_seconds: u64,
}

#[derive(Default)]
struct PublisherState {
    latest: Option<ReadResult>,
    last_known_value: Option<f64>,
}

/// Read-only facets over the latest [`ReadResult`] plus the retained
/// last-known value.
pub struct StatePublisher {
    state: RwLock<PublisherState>,
    store: Option<StateStore>,
    info: MeterInfo,
}

impl StatePublisher {
    pub fn new(info: MeterInfo, store: Option<StateStore>) -> Self {
        Self {
            state: RwLock::new(PublisherState::default()),
            store,
            info,
        }
    }

    /// Seed the last-known value from persisted state. Startup only.
    pub async fn restore(&self) {
        let Some(store) = &self.store else { return };
        if let Some(persisted) = store.load().await {
            info!(value = persisted.last_value, "Restored last meter value");
            self.state.write().await.last_known_value = Some(persisted.last_value);
        }
    }

    /// Record the result of one cycle. Success also updates the last-known
    /// value and persists it; persistence failures are non-fatal.
    pub async fn record(&self, result: &ReadResult) {
        {
            let mut state = self.state.write().await;
            if let Some(value) = result.value {
                state.last_known_value = Some(value);
            }
            state.latest = Some(result.clone());
        }

        if let (Some(store), Some(value)) = (&self.store, result.value) {
            let persisted = PersistedState {
                last_value: value,
                last_reading: result.timestamp,
            };
            if let Err(e) = store.save(&persisted).await {
                warn!(error = %e, "Failed to persist meter state");
            }
        }
    }

    /// Value facet: the latest successful reading, else the last-known
    /// value, else `None` (no successful read ever, nothing restored).
    pub async fn value(&self) -> Option<f64> {
        let state = self.state.read().await;
        match &state.latest {
            Some(result) if result.is_success() => result.value,
            _ => state.last_known_value,
        }
    }

    /// Status facet: `"unknown"` until the first cycle completes.
    pub async fn status(&self) -> String {
        let state = self.state.read().await;
        match &state.latest {
            Some(result) => result.status.as_str().to_string(),
            None => "unknown".to_string(),
        }
    }

    /// Last-reading facet: completion time of the latest cycle, formatted
    /// for display ("28.09.2025 17:45").
    pub async fn last_reading(&self) -> Option<String> {
        let state = self.state.read().await;
        state.latest.as_ref().map(|result| {
            result
                .timestamp
                .with_timezone(&Local)
                .format("%d.%m.%Y %H:%M")
                .to_string()
        })
    }

    /// Most recent failure detail, if the latest cycle failed.
    pub async fn last_error(&self) -> Option<String> {
        let state = self.state.read().await;
        state.latest.as_ref().and_then(|result| result.error.clone())
    }

    /// Auxiliary attributes for the gateway surface.
    pub async fn attributes(&self) -> Value {
        let mut attrs = json!({
            "camera": self.info.camera,
            "led": self.info.led,
            "ledDelaySeconds": self.info.led_delay_seconds,
            "pollIntervalSeconds": self.info.poll_interval_seconds,
        });
        if let Some(error) = self.last_error().await {
            attrs["lastError"] = Value::String(error);
        }
        attrs
    }

    pub async fn latest(&self) -> Option<ReadResult> {
        self.state.read().await.latest.clone()
    }

    /// Whether any cycle has ever produced data or a restore happened.
    pub async fn has_value(&self) -> bool {
        self.value().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> MeterInfo {
        MeterInfo {
            camera: "meter_cam".into(),
            led: Some("meter_led".into()),
            led_delay_seconds: 10,
            poll_interval_seconds: 3600,
        }
    }

    #[tokio::test]
    async fn facets_are_unknown_before_any_cycle() {
        let publisher = StatePublisher::new(info(), None);
        assert_eq!(publisher.value().await, None);
        assert_eq!(publisher.status().await, "unknown");
        assert_eq!(publisher.last_reading().await, None);
    }

    #[tokio::test]
    async fn success_updates_value_and_status() {
        let publisher = StatePublisher::new(info(), None);
        publisher.record(&ReadResult::success(87.18)).await;
        assert_eq!(publisher.value().await, Some(87.18));
        assert_eq!(publisher.status().await, "success");
        assert!(publisher.last_reading().await.is_some());
        assert!(publisher.latest().await.unwrap().is_success());
    }

    #[tokio::test]
    async fn failed_cycle_keeps_last_good_value() {
        let publisher = StatePublisher::new(info(), None);
        publisher.record(&ReadResult::success(87.18)).await;
        publisher.record(&ReadResult::failure("no image")).await;

        // Status and error surface the failure, the value does not regress.
        assert_eq!(publisher.value().await, Some(87.18));
        assert_eq!(publisher.status().await, "error");
        assert_eq!(publisher.last_error().await.as_deref(), Some("no image"));
    }

    #[tokio::test]
    async fn restored_value_serves_until_first_success() {
        let path = std::env::temp_dir().join(format!(
            "meterwatch-publisher-restore-{}.json",
            std::process::id()
        ));
        let store = StateStore::new(&path);
        store
            .save(&PersistedState {
                last_value: 42.5,
                last_reading: chrono::Utc::now(),
            })
            .await
            .unwrap();

        let publisher = StatePublisher::new(info(), Some(StateStore::new(&path)));
        publisher.restore().await;
        assert_eq!(publisher.value().await, Some(42.5));
        // No cycle has run, so status stays unknown.
        assert_eq!(publisher.status().await, "unknown");

        // A failed cycle still reports the restored value.
        publisher.record(&ReadResult::failure("no value")).await;
        assert_eq!(publisher.value().await, Some(42.5));

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn attributes_carry_refs_and_last_error() {
        let publisher = StatePublisher::new(info(), None);
        publisher.record(&ReadResult::failure("boom")).await;
        let attrs = publisher.attributes().await;
        assert_eq!(attrs["camera"], "meter_cam");
        assert_eq!(attrs["led"], "meter_led");
        assert_eq!(attrs["lastError"], "boom");
    }
}
