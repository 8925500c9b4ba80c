//! Log Redaction Layer
//!
//! Scrubs upstream API keys and bearer tokens from strings prior to logging.

use regex::Regex;
use std::sync::LazyLock;

/// OpenAI (`sk-`), Tavily (`tvly-`) and Google (`AIza`) keys.
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[A-Za-z0-9_\-]{16,})|(tvly-[A-Za-z0-9_\-]{16,})|(AIza[A-Za-z0-9_\-]{30,})").unwrap()
});
static BEARER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[A-Za-z0-9\-\._~+/]+=*").unwrap());
/// `key=` query parameters, as used by the vision endpoint.
static KEY_PARAM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([?&]key=)[^&\s]+").unwrap());

/// Redacts sensitive patterns in a string.
pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = API_KEY_RE.replace_all(input, "[REDACTED_KEY]");
    let redacted = BEARER_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    KEY_PARAM_RE
        .replace_all(&redacted, "${1}[REDACTED_KEY]")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "auth Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9 with tvly-HSRSHf4LlfWfzEUq75NP";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
        assert!(!clean.contains("tvly-HSRSHf4LlfWfzEUq75NP"));
    }

    #[test]
    fn redacts_query_key_and_openai_key() {
        let raw = "POST https://x.test/v1beta/models/m:generateContent?key=abc123&alt=json failed for sk-0123456789abcdefXYZ";
        let clean = redact_sensitive_data(raw);
        assert!(clean.contains("?key=[REDACTED_KEY]&alt=json"));
        assert!(!clean.contains("sk-0123456789abcdefXYZ"));
    }

    #[test]
    fn leaves_ordinary_text_alone() {
        let raw = "Primary #111111 and a sky-blue task";
        assert_eq!(redact_sensitive_data(raw), raw);
    }
}
