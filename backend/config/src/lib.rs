//! `stylescout-config`: StyleScout runtime configuration management.
//!
//! Provides:
//! - Typed config schema (server, the three upstream providers, logging)
//! - YAML loading with `${ENV_VAR}` substitution
//! - Environment variable overrides
//! - Default value application
//! - Validation (missing API keys fail startup)
//! - Secret redaction for safe logging

pub mod defaults;
pub mod env;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{MissingEnvVarError, apply_env_overrides, process_env, resolve_env_vars_with};
pub use io::{config_dir, config_file_path, load_config, parse_config};
pub use redact::{ApiKey, redact};
pub use schema::{
    GeminiConfig, LoggingConfig, OpenAiConfig, ServerConfig, StyleScoutConfig, TavilyConfig,
};
pub use defaults::apply_all_defaults;
pub use validation::{ConfigValidationError, ValidationReport, validate};

use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Values given on the command line. They win over the file and the
/// environment, and are validated like them.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub port: Option<u16>,
}

/// A config that passed validation, plus the warnings found on the way.
/// Warnings are returned rather than logged so the caller can report them
/// once its subscriber is installed.
#[derive(Debug)]
pub struct PreparedConfig {
    pub config: StyleScoutConfig,
    pub warnings: Vec<ConfigValidationError>,
}

/// Load the config file (explicit path, else the default location), then
/// run it through [`prepare`] with the process environment.
///
/// This is the main entry point for loading a config at runtime.
pub async fn load_and_prepare(
    path: Option<&Path>,
    overrides: &CliOverrides,
) -> Result<PreparedConfig> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path(&config_dir()),
    };
    let raw = load_config(&path).await?;
    prepare(raw, &process_env(), overrides)
}

/// Substitute env vars, deserialize, apply env and CLI overrides and
/// defaults, then validate. Fails only when the raw config cannot be read
/// into the schema; validation problems come back in the report.
pub fn evaluate(
    raw: Value,
    env: &HashMap<String, String>,
    overrides: &CliOverrides,
) -> Result<(StyleScoutConfig, ValidationReport)> {
    let value = resolve_env_vars_with(&raw, env).context("Failed to resolve env vars in config")?;

    let config: StyleScoutConfig =
        serde_json::from_value(value).context("Failed to deserialize config")?;

    let mut report = ValidationReport::default();
    let mut config = apply_env_overrides(config, env, &mut report);
    if let Some(port) = overrides.port {
        config.server.port = Some(port);
    }
    let config = apply_all_defaults(config);

    report.merge(validate(&config));
    Ok((config, report))
}

/// [`evaluate`], with any validation error failing the whole load.
pub fn prepare(
    raw: Value,
    env: &HashMap<String, String>,
    overrides: &CliOverrides,
) -> Result<PreparedConfig> {
    let (config, report) = evaluate(raw, env, overrides)?;
    if !report.is_valid() {
        let details: Vec<String> = report.errors.iter().map(ToString::to_string).collect();
        bail!("Invalid configuration:\n  {}", details.join("\n  "));
    }
    Ok(PreparedConfig {
        config,
        warnings: report.warnings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn prepares_from_file_and_env() {
        let raw = json!({
            "server": {"port": 8080},
            "openai": {"apiKey": "${MY_OPENAI_KEY}"},
            "gemini": {"apiKey": "AIza-file"}
        });
        let env = env(&[("MY_OPENAI_KEY", "sk-sub"), ("TAVILY_API_KEY", "tvly-env")]);
        let cfg = prepare(raw, &env, &CliOverrides::default()).unwrap().config;
        assert_eq!(cfg.server.port(), 8080);
        assert_eq!(cfg.openai.api_key.as_ref().unwrap().expose(), "sk-sub");
        assert_eq!(cfg.tavily.api_key.as_ref().unwrap().expose(), "tvly-env");
        assert_eq!(cfg.gemini.model(), defaults::DEFAULT_GEMINI_MODEL);
    }

    #[test]
    fn missing_keys_fail_startup() {
        let err = prepare(json!({}), &HashMap::new(), &CliOverrides::default())
            .unwrap_err()
            .to_string();
        assert!(err.contains("openai.apiKey"));
        assert!(err.contains("gemini.apiKey"));
        assert!(err.contains("tavily.apiKey"));
    }

    #[test]
    fn unresolved_reference_fails() {
        let raw = json!({"tavily": {"apiKey": "${UNSET_TAVILY}"}});
        assert!(prepare(raw, &HashMap::new(), &CliOverrides::default()).is_err());
    }

    fn keyed_env(extra: &[(&str, &str)]) -> HashMap<String, String> {
        let mut pairs = vec![
            ("OPENAI_API_KEY", "sk-test"),
            ("GOOGLE_GENERATIVE_AI_API_KEY", "AIza-test"),
            ("TAVILY_API_KEY", "tvly-test"),
        ];
        pairs.extend_from_slice(extra);
        env(&pairs)
    }

    #[test]
    fn cli_port_is_validated() {
        let overrides = CliOverrides { port: Some(0) };
        let err = prepare(json!({}), &keyed_env(&[]), &overrides)
            .unwrap_err()
            .to_string();
        assert!(err.contains("server.port"));

        let overrides = CliOverrides { port: Some(9090) };
        let raw = json!({"server": {"port": 8080}});
        let prepared = prepare(raw, &keyed_env(&[("STYLESCOUT_PORT", "7070")]), &overrides).unwrap();
        assert_eq!(prepared.config.server.port(), 9090);
    }

    #[test]
    fn warnings_are_returned_to_the_caller() {
        let env = keyed_env(&[("STYLESCOUT_PORT", "not-a-port")]);
        let prepared = prepare(json!({"server": {"port": 80}}), &env, &CliOverrides::default()).unwrap();
        assert_eq!(prepared.config.server.port(), 80);
        let paths: Vec<_> = prepared.warnings.iter().map(|w| w.path.as_str()).collect();
        assert_eq!(paths, vec!["STYLESCOUT_PORT"]);

        let prepared = prepare(json!({"server": {"port": 81}}), &keyed_env(&[]), &CliOverrides::default()).unwrap();
        assert_eq!(prepared.warnings[0].path, "server.port");
    }
}
