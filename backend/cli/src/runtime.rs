//! Wires config into live components: devices, vision client, coordinator.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use meterwatch_capture::DeviceRegistry;
use meterwatch_config::{config_dir, state_file_path, MeterWatchConfig};
use meterwatch_coordinator::{Coordinator, MeterInfo, StatePublisher, StateStore};
use meterwatch_vision::AnthropicVisionClient;

/// Build the coordinator with all capabilities injected. Each consumer gets
/// a handle to the one instance; nothing is looked up through globals.
pub async fn build_coordinator(
    config: &MeterWatchConfig,
    config_path: &Path,
) -> Result<Arc<Coordinator>> {
    let registry = DeviceRegistry::new(config.devices.clone());

    let camera = registry.camera(&config.meter.camera)?;
    let light = match config.meter.led.as_deref().filter(|led| !led.is_empty()) {
        Some(led) => Some(registry.light(led)?),
        None => None,
    };

    let vision = AnthropicVisionClient::new(
        config.meter.api_key.clone(),
        config.meter.models.clone(),
        config.meter.unreadable_marker.clone(),
    )?;

    // Persisted state lives next to the config file.
    let state_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(config_dir);
    let store = StateStore::new(state_file_path(&state_dir));

    let publisher = Arc::new(StatePublisher::new(
        MeterInfo {
            camera: config.meter.camera.clone(),
            led: config.meter.led.clone(),
            led_delay_seconds: config.meter.led_delay_seconds,
            poll_interval_seconds: config.meter.poll_interval_seconds,
        },
        Some(store),
    ));
    publisher.restore().await;

    Ok(Arc::new(Coordinator::new(
        camera,
        light,
        Arc::new(vision),
        config.meter.prompt.clone(),
        Duration::from_secs(config.meter.led_delay_seconds),
        publisher,
    )))
}
