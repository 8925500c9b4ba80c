//! Config defaults: applies sensible default values to parsed config.

use crate::schema::StyleScoutConfig;

pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_TAVILY_BASE_URL: &str = "https://api.tavily.com";
/// Upper bound the search API accepts for `max_results`.
pub const DEFAULT_TAVILY_MAX_RESULTS: u32 = 20;

pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Apply all defaults to a freshly loaded config.
pub fn apply_all_defaults(config: StyleScoutConfig) -> StyleScoutConfig {
    let config = apply_server_defaults(config);
    let config = apply_provider_defaults(config);
    apply_logging_defaults(config)
}

fn apply_server_defaults(mut config: StyleScoutConfig) -> StyleScoutConfig {
    config.server.bind.get_or_insert_with(|| DEFAULT_BIND.to_string());
    config.server.port.get_or_insert(DEFAULT_PORT);
    config
}

/// Fill model names, base URLs and the search result count.
fn apply_provider_defaults(mut config: StyleScoutConfig) -> StyleScoutConfig {
    config.openai.model.get_or_insert_with(|| DEFAULT_OPENAI_MODEL.to_string());
    config.openai.base_url.get_or_insert_with(|| DEFAULT_OPENAI_BASE_URL.to_string());

    config.gemini.model.get_or_insert_with(|| DEFAULT_GEMINI_MODEL.to_string());
    config.gemini.base_url.get_or_insert_with(|| DEFAULT_GEMINI_BASE_URL.to_string());

    config.tavily.base_url.get_or_insert_with(|| DEFAULT_TAVILY_BASE_URL.to_string());
    config.tavily.max_results.get_or_insert(DEFAULT_TAVILY_MAX_RESULTS);

    // Trailing slashes would double up when endpoints are appended.
    for url in [
        &mut config.openai.base_url,
        &mut config.gemini.base_url,
        &mut config.tavily.base_url,
    ]
    .into_iter()
    .flatten()
    {
        while url.ends_with('/') {
            url.pop();
        }
    }
    config
}

fn apply_logging_defaults(mut config: StyleScoutConfig) -> StyleScoutConfig {
    config.logging.level.get_or_insert_with(|| DEFAULT_LOG_LEVEL.to_string());
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_every_unset_field() {
        let cfg = apply_all_defaults(StyleScoutConfig::default());
        assert_eq!(cfg.server.port, Some(DEFAULT_PORT));
        assert_eq!(cfg.openai.model.as_deref(), Some(DEFAULT_OPENAI_MODEL));
        assert_eq!(cfg.gemini.base_url.as_deref(), Some(DEFAULT_GEMINI_BASE_URL));
        assert_eq!(cfg.tavily.max_results, Some(DEFAULT_TAVILY_MAX_RESULTS));
        assert_eq!(cfg.logging.level.as_deref(), Some(DEFAULT_LOG_LEVEL));
        // Keys have no default.
        assert!(cfg.openai.api_key.is_none());
    }

    #[test]
    fn keeps_explicit_values_and_trims_slashes() {
        let mut cfg = StyleScoutConfig::default();
        cfg.server.port = Some(9000);
        cfg.openai.base_url = Some("http://localhost:4000/v1/".into());
        let cfg = apply_all_defaults(cfg);
        assert_eq!(cfg.server.port, Some(9000));
        assert_eq!(cfg.openai.base_url.as_deref(), Some("http://localhost:4000/v1"));
    }
}
