//! Config file loading and path resolution.

use crate::env::resolve_env_vars;
use crate::schema::MeterWatchConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::info;

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// File holding the persisted last-known reading.
const STATE_FILE_NAME: &str = "state.json";

/// Resolve the meterwatch config directory.
/// Priority: `METERWATCH_CONFIG_DIR` env > `~/.meterwatch/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("METERWATCH_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".meterwatch");
    }
    PathBuf::from(".meterwatch")
}

/// Full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Full path to the persisted-state file.
pub fn state_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(STATE_FILE_NAME)
}

/// Load, env-substitute, and parse the config from disk.
///
/// The meter section is mandatory (there is no useful zero config), so a
/// missing file is an error rather than a silent default.
pub async fn load_config(path: &Path) -> Result<MeterWatchConfig> {
    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let tree: serde_json::Value = serde_yaml::from_str(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    let resolved = resolve_env_vars(&tree)?;

    let mut config: MeterWatchConfig = serde_json::from_value(resolved)
        .with_context(|| format!("Invalid config structure at: {}", path.display()))?;

    config.apply_overrides();

    info!(path = %path.display(), "Loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_applies_overrides() {
        let dir = std::env::temp_dir().join(format!("meterwatch-io-{}", std::process::id()));
        fs::create_dir_all(&dir).await.unwrap();
        let path = config_file_path(&dir);
        fs::write(
            &path,
            "meter:\n  apiKey: sk-ant-x\n  camera: cam\noverrides:\n  pollIntervalSeconds: 900\n",
        )
        .await
        .unwrap();

        let config = load_config(&path).await.unwrap();
        assert_eq!(config.meter.poll_interval_seconds, 900);

        fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let path = Path::new("/nonexistent/meterwatch/config.yaml");
        assert!(load_config(path).await.is_err());
    }
}
