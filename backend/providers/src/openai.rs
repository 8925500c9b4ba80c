use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, check_status};
use crate::traits::TextGenerator;

const SERVICE: &str = "openai";

/// OpenAI-compatible chat completions client.
pub struct OpenAiTextGenerator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiTextGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChatMessage,
}

fn build_request<'a>(model: &'a str, prompt: &str) -> ChatRequest<'a> {
    ChatRequest {
        model,
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: Some(prompt.to_string()),
        }],
    }
}

fn parse_response(response: ChatResponse) -> Result<String, ProviderError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ProviderError::malformed(SERVICE, "no message content in choices"))
}

#[async_trait]
impl TextGenerator for OpenAiTextGenerator {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        debug!(model = %self.model, "Sending request to OpenAI");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&build_request(&self.model, prompt))
            .send()
            .await
            .map_err(ProviderError::fetch(SERVICE))?;

        let response = check_status(SERVICE, response).await?;
        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(SERVICE, e.to_string()))?;
        parse_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_has_single_user_message() {
        let body = serde_json::to_value(build_request("gpt-4o", "idea")).unwrap();
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"], "idea");
    }

    #[test]
    fn parses_first_choice() {
        let raw = serde_json::json!({
            "choices": [{"message": {"role": "assistant", "content": " fintech dashboard UI \n"}}]
        });
        let response: ChatResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parse_response(response).unwrap(), " fintech dashboard UI \n");
    }

    #[test]
    fn empty_choices_is_malformed() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(
            parse_response(response),
            Err(ProviderError::Malformed { service: "openai", .. })
        ));
    }
}
