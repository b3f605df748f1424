//! meterwatch configuration schema, typed for serde YAML deserialization.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::defaults;

/// Root configuration for the meterwatch service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterWatchConfig {
    /// Meter reading parameters (API key, device refs, schedule, prompt).
    pub meter: MeterConfig,

    /// Optional per-key override layer; an override wins over the base
    /// value whenever it is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<MeterOverrides>,

    /// Physical devices the meter refs resolve against.
    #[serde(default)]
    pub devices: DevicesConfig,

    /// HTTP gateway bind settings.
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl MeterWatchConfig {
    /// Fold the override layer into the base meter config, per key.
    pub fn apply_overrides(&mut self) {
        let Some(overrides) = self.overrides.take() else { return };
        if let Some(led) = overrides.led {
            self.meter.led = Some(led);
        }
        if let Some(delay) = overrides.led_delay_seconds {
            self.meter.led_delay_seconds = delay;
        }
        if let Some(interval) = overrides.poll_interval_seconds {
            self.meter.poll_interval_seconds = interval;
        }
        if let Some(prompt) = overrides.prompt {
            self.meter.prompt = prompt;
        }
    }
}

/// Parameters of the read cycle itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterConfig {
    /// Anthropic API key (expected to start with `sk-ant-`).
    pub api_key: String,

    /// Ref of the camera pointed at the meter; must exist in `devices.cameras`.
    pub camera: String,

    /// Optional ref of the illumination LED; must exist in `devices.lights`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led: Option<String>,

    /// Seconds the LED stays on after the cycle finishes (1..=30).
    #[serde(default = "defaults::led_delay_seconds")]
    pub led_delay_seconds: u64,

    /// Seconds between scheduled reads (300..=3600).
    #[serde(default = "defaults::poll_interval_seconds")]
    pub poll_interval_seconds: u64,

    /// Instruction prompt sent alongside the meter image.
    #[serde(default = "defaults::prompt")]
    pub prompt: String,

    /// Reply text meaning "could not read the meter"; must match the prompt.
    #[serde(default = "defaults::unreadable_marker")]
    pub unreadable_marker: String,

    /// Model candidates tried in order until one yields a number.
    #[serde(default = "defaults::model_candidates")]
    pub models: Vec<String>,
}

/// Per-key overrides for [`MeterConfig`]; mirrors the runtime-adjustable
/// subset of the meter settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub led_delay_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poll_interval_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
}

/// Named devices the meter refs resolve against.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicesConfig {
    #[serde(default)]
    pub cameras: HashMap<String, CameraSpec>,
    #[serde(default)]
    pub lights: HashMap<String, LightSpec>,
}

/// A camera reachable via an HTTP snapshot endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraSpec {
    /// URL returning a single still image on GET.
    pub snapshot_url: String,

    /// Timeout for the snapshot request, in seconds.
    #[serde(default = "defaults::snapshot_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// A light reachable via an HTTP on/off endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightSpec {
    /// URL accepting `{"state": "on"|"off"}` on POST.
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayConfig {
    #[serde(default = "defaults::gateway_bind")]
    pub bind: String,
    #[serde(default = "defaults::gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: defaults::gateway_bind(),
            port: defaults::gateway_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Directory for rolling NDJSON log files; console-only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        "meter:\n  apiKey: sk-ant-test\n  camera: meter_cam\n"
    }

    #[test]
    fn minimal_config_gets_defaults() {
        let config: MeterWatchConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        assert_eq!(config.meter.led_delay_seconds, 10);
        assert_eq!(config.meter.poll_interval_seconds, 3600);
        assert_eq!(config.meter.unreadable_marker, "FEHLER");
        assert_eq!(config.meter.models.len(), 3);
        assert!(config.meter.prompt.contains("FEHLER"));
        assert_eq!(config.gateway.port, 8084);
    }

    #[test]
    fn overrides_win_per_key() {
        let yaml = "\
meter:
  apiKey: sk-ant-test
  camera: meter_cam
  led: base_led
  ledDelaySeconds: 5
overrides:
  ledDelaySeconds: 20
  prompt: custom prompt
";
        let mut config: MeterWatchConfig = serde_yaml::from_str(yaml).unwrap();
        config.apply_overrides();
        // Overridden keys take the override value, others keep the base.
        assert_eq!(config.meter.led_delay_seconds, 20);
        assert_eq!(config.meter.prompt, "custom prompt");
        assert_eq!(config.meter.led.as_deref(), Some("base_led"));
        assert_eq!(config.meter.poll_interval_seconds, 3600);
        assert!(config.overrides.is_none());
    }

    #[test]
    fn devices_parse_with_camel_case_keys() {
        let yaml = "\
meter:
  apiKey: sk-ant-test
  camera: meter_cam
devices:
  cameras:
    meter_cam:
      snapshotUrl: http://10.0.0.5/snapshot.jpg
  lights:
    meter_led:
      url: http://10.0.0.5/light
";
        let config: MeterWatchConfig = serde_yaml::from_str(yaml).unwrap();
        let cam = config.devices.cameras.get("meter_cam").unwrap();
        assert_eq!(cam.snapshot_url, "http://10.0.0.5/snapshot.jpg");
        assert_eq!(cam.timeout_seconds, 10);
        assert!(config.devices.lights.contains_key("meter_led"));
    }
}
