//! Device registry: resolves configured camera/light refs to live drivers.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use meterwatch_config::DevicesConfig;
use meterwatch_core::{ImageSource, LightSink, MeterError};

use crate::{HttpLight, SnapshotCamera};

/// Builds drivers from the `devices` config section and hands them out by
/// ref. Resolution happens once at startup; consumers hold the returned
/// `Arc` handles directly instead of looking refs up again later.
pub struct DeviceRegistry {
    devices: DevicesConfig,
}

impl DeviceRegistry {
    pub fn new(devices: DevicesConfig) -> Self {
        Self { devices }
    }

    /// Resolve a camera ref to a snapshot driver.
    pub fn camera(&self, name: &str) -> Result<Arc<dyn ImageSource>, MeterError> {
        let spec = self
            .devices
            .cameras
            .get(name)
            .ok_or_else(|| MeterError::SourceNotFound(name.to_string()))?;
        let camera = SnapshotCamera::new(
            name,
            spec.snapshot_url.as_str(),
            Duration::from_secs(spec.timeout_seconds),
        )?;
        info!(camera = name, url = %spec.snapshot_url, "Resolved camera");
        Ok(Arc::new(camera))
    }

    /// Resolve a light ref to an HTTP light driver.
    pub fn light(&self, name: &str) -> Result<Arc<dyn LightSink>, MeterError> {
        let spec = self
            .devices
            .lights
            .get(name)
            .ok_or_else(|| MeterError::SourceNotFound(name.to_string()))?;
        let light = HttpLight::new(name, spec.url.as_str())?;
        info!(light = name, url = %spec.url, "Resolved light");
        Ok(Arc::new(light))
    }
}
