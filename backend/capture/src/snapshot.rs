//! HTTP snapshot camera: one still image per GET request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use meterwatch_core::{ImageSource, MeterError};

/// Camera reachable through an HTTP snapshot endpoint (ESPHome-style
/// `/snapshot.jpg`). A single attempt is made per call; re-reading on the
/// next cycle is the only retry.
pub struct SnapshotCamera {
    name: String,
    client: Client,
    snapshot_url: String,
}

impl SnapshotCamera {
    pub fn new(
        name: impl Into<String>,
        snapshot_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, MeterError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| MeterError::ConfigError(format!("snapshot client: {e}")))?;
        Ok(Self {
            name: name.into(),
            client,
            snapshot_url: snapshot_url.into(),
        })
    }
}

#[async_trait]
impl ImageSource for SnapshotCamera {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_image(&self) -> Result<Vec<u8>, MeterError> {
        let response = self
            .client
            .get(&self.snapshot_url)
            .send()
            .await
            .map_err(|e| MeterError::CaptureError(format!("{}: {e}", self.name)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeterError::CaptureError(format!(
                "{}: snapshot endpoint returned HTTP {status}",
                self.name
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MeterError::CaptureError(format!("{}: {e}", self.name)))?;

        debug!(camera = %self.name, size = bytes.len(), "Captured snapshot");
        Ok(bytes.to_vec())
    }
}
