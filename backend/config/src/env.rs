//! Environment variable substitution and overrides for config values.
//!
//! Supports `${VAR_NAME}` syntax in string values, resolved at load time.
//! Only uppercase `[A-Z_][A-Z0-9_]*` variable names are matched.
//! `$${VAR}` escapes to a literal `${VAR}`.

use anyhow::{Result, bail};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

use crate::redact::ApiKey;
use crate::schema::StyleScoutConfig;
use crate::validation::ValidationReport;

/// `$${VAR}` (escaped) or `${VAR}` (reference).
static ENV_VAR_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

pub const ENV_BIND: &str = "STYLESCOUT_BIND";
pub const ENV_PORT: &str = "STYLESCOUT_PORT";
pub const ENV_LOG_LEVEL: &str = "RUST_LOG";
pub const ENV_LOG_DIR: &str = "STYLESCOUT_LOG_DIR";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_GEMINI_API_KEY: &str = "GOOGLE_GENERATIVE_AI_API_KEY";
pub const ENV_TAVILY_API_KEY: &str = "TAVILY_API_KEY";

/// Error returned for missing env vars.
#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Snapshot of the process environment.
pub fn process_env() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Substitute `${VAR}` references in a config JSON value tree.
///
/// Walks the entire value tree recursively; only string leaves are processed.
/// Returns an error if any referenced env var is not set or is empty.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value> {
    match value {
        Value::String(s) => Ok(Value::String(substitute_string(s, env, path)?)),
        Value::Array(arr) => {
            let result: Result<Vec<_>> = arr
                .iter()
                .enumerate()
                .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
                .collect();
            Ok(Value::Array(result?))
        }
        Value::Object(map) => {
            let mut result = serde_json::Map::new();
            for (k, v) in map {
                let child_path = if path.is_empty() {
                    k.clone()
                } else {
                    format!("{path}.{k}")
                };
                result.insert(k.clone(), substitute_value(v, env, &child_path)?);
            }
            Ok(Value::Object(result))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String> {
    if !s.contains('$') {
        return Ok(s.to_string());
    }

    let mut missing: Option<MissingEnvVarError> = None;
    let substituted = ENV_VAR_PATTERN.replace_all(s, |caps: &regex::Captures| {
        let var_name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{var_name}}}");
        }
        match env.get(var_name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: var_name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    if let Some(err) = missing {
        bail!(err);
    }
    Ok(substituted.into_owned())
}

/// Overlay well-known environment variables onto the config. Set, non-empty
/// variables win over file values; unusable ones are reported as warnings.
pub fn apply_env_overrides(
    mut config: StyleScoutConfig,
    env: &HashMap<String, String>,
    report: &mut ValidationReport,
) -> StyleScoutConfig {
    let get = |name: &str| env.get(name).filter(|v| !v.trim().is_empty()).cloned();

    if let Some(bind) = get(ENV_BIND) {
        config.server.bind = Some(bind);
    }
    if let Some(port) = get(ENV_PORT) {
        match port.parse::<u16>() {
            Ok(port) => config.server.port = Some(port),
            Err(_) => report.warn(ENV_PORT, format!("Ignoring invalid value '{port}'")),
        }
    }
    if let Some(level) = get(ENV_LOG_LEVEL) {
        config.logging.level = Some(level);
    }
    if let Some(dir) = get(ENV_LOG_DIR) {
        config.logging.dir = Some(dir);
    }
    if let Some(key) = get(ENV_OPENAI_API_KEY) {
        config.openai.api_key = Some(ApiKey::new(key));
    }
    if let Some(key) = get(ENV_GEMINI_API_KEY) {
        config.gemini.api_key = Some(ApiKey::new(key));
    }
    if let Some(key) = get(ENV_TAVILY_API_KEY) {
        config.tavily.api_key = Some(ApiKey::new(key));
    }
    config
}
