//! Config file discovery and loading.

use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Default config file name within the config directory.
const CONFIG_FILE_NAME: &str = "config.yaml";

/// Resolve the StyleScout config directory.
/// Priority: `STYLESCOUT_CONFIG_DIR` env > `~/.stylescout/` > `./.stylescout/`
pub fn config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STYLESCOUT_CONFIG_DIR") {
        return PathBuf::from(dir);
    }
    match dirs::home_dir() {
        Some(home) => home.join(".stylescout"),
        None => PathBuf::from(".stylescout"),
    }
}

/// Resolve the full path to the main config file.
pub fn config_file_path(config_dir: &Path) -> PathBuf {
    config_dir.join(CONFIG_FILE_NAME)
}

/// Load the config file as an untyped JSON tree, ready for env
/// substitution.
///
/// Returns an empty object if the file doesn't exist: everything then
/// comes from defaults and the environment.
pub async fn load_config(path: &Path) -> Result<Value> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        return Ok(Value::Object(Default::default()));
    }

    let raw = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let value = parse_config(&raw)
        .with_context(|| format!("Failed to parse config YAML at: {}", path.display()))?;

    info!(path = %path.display(), "Loaded config");
    Ok(value)
}

/// Parse YAML text into a JSON tree. An empty document is an empty object.
pub fn parse_config(raw: &str) -> Result<Value> {
    let yaml: serde_yaml::Value = serde_yaml::from_str(raw)?;
    if yaml.is_null() {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::to_value(yaml)?)
}
