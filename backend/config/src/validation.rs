//! Config validation: deep schema checks with user-friendly error messages.

use crate::env::{ENV_GEMINI_API_KEY, ENV_OPENAI_API_KEY, ENV_TAVILY_API_KEY};
use crate::redact::ApiKey;
use crate::schema::StyleScoutConfig;
use thiserror::Error;

/// A config validation error with field path and message.
#[derive(Debug, Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigValidationError {
    pub path: String,
    pub message: String,
}

/// A collection of validation errors found in one pass.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            path: path.into(),
            message: message.into(),
        });
    }
}

/// Validate the config and return a report of all errors and warnings.
pub fn validate(config: &StyleScoutConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_api_keys(config, &mut report);
    validate_server(config, &mut report);
    validate_endpoints(config, &mut report);
    validate_search(config, &mut report);
    report
}

/// Every upstream needs a key; there is no built-in fallback.
fn validate_api_keys(config: &StyleScoutConfig, report: &mut ValidationReport) {
    let keys: [(&str, &str, &Option<ApiKey>); 3] = [
        ("openai.apiKey", ENV_OPENAI_API_KEY, &config.openai.api_key),
        ("gemini.apiKey", ENV_GEMINI_API_KEY, &config.gemini.api_key),
        ("tavily.apiKey", ENV_TAVILY_API_KEY, &config.tavily.api_key),
    ];
    for (path, env_var, key) in keys {
        if key.as_ref().is_none_or(ApiKey::is_blank) {
            report.error(path, format!("API key is required; set it in the config file or via {env_var}"));
        }
    }
}

fn validate_server(config: &StyleScoutConfig, report: &mut ValidationReport) {
    let Some(port) = config.server.port else { return };
    if port == 0 {
        report.error("server.port", "Port must be > 0");
    } else if port < 1024 && port != 80 && port != 443 {
        report.warn(
            "server.port",
            format!("Port {port} requires elevated privileges; consider using a port >= 1024"),
        );
    }
}

fn validate_endpoints(config: &StyleScoutConfig, report: &mut ValidationReport) {
    let urls = [
        ("openai.baseUrl", &config.openai.base_url),
        ("gemini.baseUrl", &config.gemini.base_url),
        ("tavily.baseUrl", &config.tavily.base_url),
    ];
    for (path, url) in urls {
        let Some(url) = url else { continue };
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            report.error(path, format!("'{url}' is not an http(s) URL"));
        } else if url.starts_with("http://") {
            report.warn(path, "Plain http endpoint; API keys will be sent unencrypted");
        }
    }
}

fn validate_search(config: &StyleScoutConfig, report: &mut ValidationReport) {
    let Some(max) = config.tavily.max_results else { return };
    if !(1..=20).contains(&max) {
        report.error("tavily.maxResults", format!("maxResults must be between 1 and 20, got {max}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_config() -> StyleScoutConfig {
        let mut cfg = StyleScoutConfig::default();
        cfg.openai.api_key = Some(ApiKey::new("sk-test"));
        cfg.gemini.api_key = Some(ApiKey::new("AIza-test"));
        cfg.tavily.api_key = Some(ApiKey::new("tvly-test"));
        cfg
    }

    #[test]
    fn complete_config_is_valid() {
        let report = validate(&complete_config());
        assert!(report.is_valid(), "errors: {:?}", report.errors);
    }

    #[test]
    fn missing_keys_are_errors() {
        let report = validate(&StyleScoutConfig::default());
        let paths: Vec<_> = report.errors.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, vec!["openai.apiKey", "gemini.apiKey", "tavily.apiKey"]);
        assert!(report.errors[2].message.contains("TAVILY_API_KEY"));
    }

    #[test]
    fn blank_key_is_an_error() {
        let mut cfg = complete_config();
        cfg.gemini.api_key = Some(ApiKey::new("   "));
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].path, "gemini.apiKey");
    }

    #[test]
    fn port_and_result_limits() {
        let mut cfg = complete_config();
        cfg.server.port = Some(0);
        cfg.tavily.max_results = Some(50);
        let report = validate(&cfg);
        assert_eq!(report.errors.len(), 2);

        cfg.server.port = Some(81);
        cfg.tavily.max_results = Some(20);
        let report = validate(&cfg);
        assert!(report.is_valid());
        assert_eq!(report.warnings[0].path, "server.port");
    }

    #[test]
    fn base_url_must_be_http() {
        let mut cfg = complete_config();
        cfg.openai.base_url = Some("ftp://proxy".into());
        let report = validate(&cfg);
        assert_eq!(report.errors[0].path, "openai.baseUrl");
    }
}
