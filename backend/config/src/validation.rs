//! Config validation: deep checks with field paths and user-friendly messages.

use crate::schema::MeterWatchConfig;
use thiserror::Error;

/// A config validation finding with field path and message.
#[derive(Debug, Error)]
#[error("{path}: {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation findings from one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
///
/// Run after override merging, so the checks see the effective values.
pub fn validate(config: &MeterWatchConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_meter(config, &mut report);
    validate_device_refs(config, &mut report);
    validate_gateway(config, &mut report);
    report
}

fn validate_meter(config: &MeterWatchConfig, report: &mut ValidationReport) {
    let meter = &config.meter;

    if meter.api_key.trim().is_empty() {
        report.error("meter.apiKey", "API key is required");
    } else if !meter.api_key.starts_with("sk-ant-") {
        report.error("meter.apiKey", "API key must start with 'sk-ant-'");
    }

    if !(1..=30).contains(&meter.led_delay_seconds) {
        report.error(
            "meter.ledDelaySeconds",
            format!(
                "must be between 1 and 30 seconds (got {})",
                meter.led_delay_seconds
            ),
        );
    }

    if !(300..=3600).contains(&meter.poll_interval_seconds) {
        report.error(
            "meter.pollIntervalSeconds",
            format!(
                "must be between 300 and 3600 seconds (got {})",
                meter.poll_interval_seconds
            ),
        );
    }

    if meter.models.is_empty() {
        report.error("meter.models", "At least one model candidate is required");
    }
    for (i, model) in meter.models.iter().enumerate() {
        if model.trim().is_empty() {
            report.error(format!("meter.models[{i}]"), "Model id cannot be empty");
        }
    }

    if meter.prompt.trim().is_empty() {
        report.error("meter.prompt", "Prompt cannot be empty");
    } else if !meter.prompt.contains(&meter.unreadable_marker) {
        report.warn(
            "meter.prompt",
            format!(
                "Prompt never mentions the unreadable marker '{}'; the model cannot signal an unreadable meter",
                meter.unreadable_marker
            ),
        );
    }
}

/// Camera and LED refs must resolve against the declared devices.
fn validate_device_refs(config: &MeterWatchConfig, report: &mut ValidationReport) {
    let meter = &config.meter;

    if !config.devices.cameras.contains_key(&meter.camera) {
        report.error(
            "meter.camera",
            format!("Unknown camera ref '{}'; declare it under devices.cameras", meter.camera),
        );
    }

    if let Some(led) = &meter.led {
        if !led.is_empty() && !config.devices.lights.contains_key(led) {
            report.error(
                "meter.led",
                format!("Unknown light ref '{led}'; declare it under devices.lights"),
            );
        }
    }
}

fn validate_gateway(config: &MeterWatchConfig, report: &mut ValidationReport) {
    let port = config.gateway.port;
    if port < 1024 && port != 80 && port != 443 {
        report.warn(
            "gateway.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CameraSpec, LightSpec, MeterWatchConfig};

    fn base_config() -> MeterWatchConfig {
        let mut config: MeterWatchConfig = serde_yaml::from_str(
            "meter:\n  apiKey: sk-ant-test\n  camera: meter_cam\n  led: meter_led\n",
        )
        .unwrap();
        config.devices.cameras.insert(
            "meter_cam".into(),
            CameraSpec {
                snapshot_url: "http://cam/snapshot.jpg".into(),
                timeout_seconds: 10,
            },
        );
        config.devices.lights.insert(
            "meter_led".into(),
            LightSpec {
                url: "http://cam/light".into(),
            },
        );
        config
    }

    #[test]
    fn valid_config_passes() {
        let report = validate(&base_config());
        assert!(report.is_valid(), "unexpected errors: {:?}", report.errors);
    }

    #[test]
    fn wrong_key_prefix_is_an_error() {
        let mut config = base_config();
        config.meter.api_key = "sk-openai-nope".into();
        let report = validate(&config);
        assert!(report.errors.iter().any(|e| e.path == "meter.apiKey"));
    }

    #[test]
    fn led_delay_out_of_range_is_an_error() {
        let mut config = base_config();
        config.meter.led_delay_seconds = 31;
        let report = validate(&config);
        assert!(report.errors.iter().any(|e| e.path == "meter.ledDelaySeconds"));
    }

    #[test]
    fn poll_interval_out_of_range_is_an_error() {
        let mut config = base_config();
        config.meter.poll_interval_seconds = 60;
        let report = validate(&config);
        assert!(report.errors.iter().any(|e| e.path == "meter.pollIntervalSeconds"));
    }

    #[test]
    fn unresolved_camera_ref_is_an_error() {
        let mut config = base_config();
        config.meter.camera = "ghost_cam".into();
        let report = validate(&config);
        assert!(report.errors.iter().any(|e| e.path == "meter.camera"));
    }

    #[test]
    fn unresolved_led_ref_is_an_error_but_absent_led_is_fine() {
        let mut config = base_config();
        config.meter.led = Some("ghost_led".into());
        assert!(!validate(&config).is_valid());

        config.meter.led = None;
        assert!(validate(&config).is_valid());
    }
}
