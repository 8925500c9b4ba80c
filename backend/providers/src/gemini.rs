use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ProviderError, check_status};
use crate::image_fetch::guess_mime_type;
use crate::traits::{ImageInput, VisionAnalyzer};

const SERVICE: &str = "gemini";

/// Gemini `generateContent` client for image analysis.
pub struct GeminiVisionAnalyzer {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiVisionAnalyzer {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum Part {
    Text(String),
    #[serde(rename_all = "camelCase")]
    InlineData { mime_type: String, data: String },
    #[serde(rename_all = "camelCase")]
    FileData { mime_type: String, file_uri: String },
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

fn build_request(prompt: &str, image: &ImageInput) -> GenerateRequest {
    let image_part = match image {
        ImageInput::Inline { mime_type, data } => Part::InlineData {
            mime_type: mime_type.clone(),
            data: STANDARD.encode(data),
        },
        ImageInput::Url(url) => Part::FileData {
            mime_type: guess_mime_type(url).to_string(),
            file_uri: url.clone(),
        },
    };
    GenerateRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![Part::Text(prompt.to_string()), image_part],
        }],
    }
}

/// Joins the text parts of the first candidate.
fn parse_response(response: GenerateResponse) -> Result<String, ProviderError> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();
    let text: String = parts.into_iter().filter_map(|p| p.text).collect();
    if text.is_empty() {
        return Err(ProviderError::malformed(SERVICE, "no text in first candidate"));
    }
    Ok(text)
}

#[async_trait]
impl VisionAnalyzer for GeminiVisionAnalyzer {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn analyze(&self, prompt: &str, image: &ImageInput) -> Result<String, ProviderError> {
        info!(model = %self.model, inline = matches!(image, ImageInput::Inline { .. }), "Analyzing image via Gemini");

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", self.base_url, self.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&build_request(prompt, image))
            .send()
            .await
            .map_err(ProviderError::fetch(SERVICE))?;

        let response = check_status(SERVICE, response).await?;
        let body: GenerateResponse = response
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
    fn inline_image_is_base64() {
        let image = ImageInput::Inline {
            mime_type: "image/png".into(),
            data: vec![1, 2, 3],
        };
        let body = serde_json::to_value(build_request("describe", &image)).unwrap();
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], "describe");
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/png");
        assert_eq!(parts[1]["inlineData"]["data"], "AQID");
    }

    #[test]
    fn url_fallback_uses_file_data() {
        let image = ImageInput::Url("https://img.test/shot.webp".into());
        let body = serde_json::to_value(build_request("describe", &image)).unwrap();
        let part = &body["contents"][0]["parts"][1]["fileData"];
        assert_eq!(part["fileUri"], "https://img.test/shot.webp");
        assert_eq!(part["mimeType"], "image/webp");
    }

    #[test]
    fn joins_text_parts() {
        let raw = serde_json::json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"text": "## Colors\n"}, {"text": "- Primary #111111"}
            ]}}]
        });
        let response: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parse_response(response).unwrap(), "## Colors\n- Primary #111111");
    }

    #[test]
    fn blocked_candidate_is_malformed() {
        let raw = serde_json::json!({"candidates": [{"finishReason": "SAFETY"}]});
        let response: GenerateResponse = serde_json::from_value(raw).unwrap();
        assert!(parse_response(response).is_err());
    }
}
