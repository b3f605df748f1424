//! HTTP light driver for the meter illumination LED.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use meterwatch_core::{LightSink, MeterError};

/// Light reachable through an HTTP endpoint accepting `{"state": "on"|"off"}`.
///
/// Callers treat failures here as non-fatal; the driver only reports them.
pub struct HttpLight {
    name: String,
    client: Client,
    url: String,
}

impl HttpLight {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self, MeterError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| MeterError::ConfigError(format!("light client: {e}")))?;
        Ok(Self {
            name: name.into(),
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl LightSink for HttpLight {
    fn name(&self) -> &str {
        &self.name
    }

    async fn set_light(&self, on: bool) -> Result<(), MeterError> {
        let state = if on { "on" } else { "off" };
        let response = self
            .client
            .post(&self.url)
            .json(&json!({ "state": state }))
            .send()
            .await
            .map_err(|e| MeterError::CaptureError(format!("{}: {e}", self.name)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MeterError::CaptureError(format!(
                "{}: light endpoint returned HTTP {status}",
                self.name
            )));
        }

        debug!(light = %self.name, state, "Switched light");
        Ok(())
    }
}
