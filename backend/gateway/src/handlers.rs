//! Pipeline endpoints.
//!
//! Each handler pulls its one required string from the JSON body, calls
//! the upstream it owns, and logs a `PipelineEvent` under a fresh request id.

use axum::{Json, extract::State};
use serde::Serialize;
use serde_json::Value;
use stylescout_logging::{EventLogger, PipelineEvent, redact_sensitive_data};
use stylescout_markdown::{MarkdownNode, Renderer, render_document};
use stylescout_providers::prompts::{DESIGN_ANALYSIS_PROMPT, search_query_prompt};
use stylescout_providers::{ImageInput, ImageResult, ProviderError};
use tracing::{error, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::GatewayState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPromptResponse {
    pub search_prompt: String,
}

#[derive(Debug, Serialize)]
pub struct SearchImagesResponse {
    pub images: Vec<ImageResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeImageResponse {
    pub design_prompt: String,
    pub document: Vec<MarkdownNode>,
    pub html: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub document: Vec<MarkdownNode>,
    pub html: String,
}

fn required_str<'a>(body: &'a Value, field: &str, label: &'static str) -> Result<&'a str, ApiError> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingField(label))
}

/// Provider errors can echo request URLs or headers back.
fn log_safe(err: &ProviderError) -> String {
    redact_sensitive_data(&err.to_string())
}

/// Logs the cause and wraps it; only the operation name reaches the client.
fn upstream(request_id: Uuid, operation: &'static str) -> impl FnOnce(ProviderError) -> ApiError {
    move |source| {
        let error_msg = log_safe(&source);
        error!(%request_id, error = %error_msg, "Failed to {operation}");
        EventLogger::log_event(
            request_id,
            PipelineEvent::UpstreamFailed {
                operation: operation.to_string(),
                error_msg,
            },
        );
        ApiError::Upstream { operation, source }
    }
}

fn count_colors(nodes: &[MarkdownNode]) -> usize {
    nodes
        .iter()
        .map(|node| match node {
            MarkdownNode::Color(_) => 1,
            other => other.children().map_or(0, count_colors),
        })
        .sum()
}

/// `POST /api/generate-search-prompt`
pub async fn generate_search_prompt(
    State(state): State<GatewayState>,
    Json(body): Json<Value>,
) -> Result<Json<SearchPromptResponse>, ApiError> {
    let idea = required_str(&body, "applicationIdea", "Application idea")?;
    let request_id = Uuid::new_v4();

    let raw = state
        .text
        .generate(&search_query_prompt(idea))
        .await
        .map_err(upstream(request_id, "generate search prompt"))?;
    let search_prompt = raw.trim().to_string();

    EventLogger::log_event(
        request_id,
        PipelineEvent::SearchPromptGenerated {
            idea: idea.to_string(),
            search_prompt: search_prompt.clone(),
        },
    );
    Ok(Json(SearchPromptResponse { search_prompt }))
}

/// `POST /api/search-images`
pub async fn search_images(
    State(state): State<GatewayState>,
    Json(body): Json<Value>,
) -> Result<Json<SearchImagesResponse>, ApiError> {
    let query = required_str(&body, "searchPrompt", "Search prompt")?;
    let request_id = Uuid::new_v4();

    let images = state
        .search
        .search_images(query)
        .await
        .map_err(upstream(request_id, "search images"))?;

    EventLogger::log_event(
        request_id,
        PipelineEvent::ImagesFound {
            search_prompt: query.to_string(),
            count: images.len(),
        },
    );
    Ok(Json(SearchImagesResponse { images }))
}

/// `POST /api/analyze-image`
///
/// The image is downloaded and sent inline; when the download fails the
/// model gets the URL instead.
pub async fn analyze_image(
    State(state): State<GatewayState>,
    Json(body): Json<Value>,
) -> Result<Json<AnalyzeImageResponse>, ApiError> {
    let image_url = required_str(&body, "imageUrl", "Image URL")?;
    let request_id = Uuid::new_v4();

    let image = match state.images.fetch(image_url).await {
        Ok(image) => image,
        Err(e) => {
            let reason = log_safe(&e);
            warn!(%request_id, error = %reason, "Image download failed, passing URL to the model");
            EventLogger::log_event(
                request_id,
                PipelineEvent::ImageFetchFallback {
                    image_url: image_url.to_string(),
                    reason,
                },
            );
            ImageInput::Url(image_url.to_string())
        }
    };

    let design_prompt = state
        .vision
        .analyze(DESIGN_ANALYSIS_PROMPT, &image)
        .await
        .map_err(upstream(request_id, "analyze image"))?;

    let document = render_document(&design_prompt);
    let html = Renderer::to_html(&document);

    EventLogger::log_event(
        request_id,
        PipelineEvent::DesignAnalyzed {
            image_url: image_url.to_string(),
            color_count: count_colors(&document),
        },
    );
    Ok(Json(AnalyzeImageResponse {
        design_prompt,
        document,
        html,
    }))
}

/// `POST /api/render`
pub async fn render(Json(body): Json<Value>) -> Result<Json<RenderResponse>, ApiError> {
    let markdown = required_str(&body, "markdown", "Markdown")?;

    let document = render_document(markdown);
    let html = Renderer::to_html(&document);

    EventLogger::log_event(
        Uuid::new_v4(),
        PipelineEvent::DocumentRendered {
            color_count: count_colors(&document),
        },
    );
    Ok(Json(RenderResponse { document, html }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use serde_json::json;
    use std::sync::Arc;
    use stylescout_providers::mock::{
        MockImageSearch, MockImageSource, MockTextGenerator, MockVisionAnalyzer,
    };

    const DESIGN: &str = "## Colors\n\nPrimary #111111, accent rgb(255, 0, 0).\n";

    fn state_with(
        text: MockTextGenerator,
        search: MockImageSearch,
        vision: Arc<MockVisionAnalyzer>,
        images: MockImageSource,
    ) -> GatewayState {
        GatewayState::new(Arc::new(text), Arc::new(search), vision, Arc::new(images))
    }

    fn happy_state() -> GatewayState {
        state_with(
            MockTextGenerator::new("  fintech dashboard UI \n"),
            MockImageSearch::new(vec![ImageResult {
                url: "https://img.test/a.png".into(),
                description: "dark dashboard".into(),
            }]),
            Arc::new(MockVisionAnalyzer::new(DESIGN)),
            MockImageSource::new("image/png", vec![1, 2, 3]),
        )
    }

    fn failing_state() -> GatewayState {
        state_with(
            MockTextGenerator::failing("quota exceeded"),
            MockImageSearch::failing("bad key"),
            Arc::new(MockVisionAnalyzer::failing("model overloaded")),
            MockImageSource::unreachable(),
        )
    }

    async fn error_body(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn search_prompt_is_trimmed() {
        let Json(resp) = generate_search_prompt(
            State(happy_state()),
            Json(json!({ "applicationIdea": "budgeting app" })),
        )
        .await
        .unwrap();
        assert_eq!(resp.search_prompt, "fintech dashboard UI");
    }

    #[tokio::test]
    async fn missing_or_empty_fields_are_bad_requests() {
        let err = generate_search_prompt(State(happy_state()), Json(json!({})))
            .await
            .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "Application idea is required" }));

        let err = search_images(State(happy_state()), Json(json!({ "searchPrompt": "" })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Search prompt is required");

        let err = analyze_image(State(happy_state()), Json(json!({ "imageUrl": 42 })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Image URL is required");

        let err = render(Json(json!({ "markdown": null }))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upstream_failures_hide_the_cause() {
        let err = generate_search_prompt(
            State(failing_state()),
            Json(json!({ "applicationIdea": "budgeting app" })),
        )
        .await
        .unwrap_err();
        let (status, body) = error_body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Failed to generate search prompt" }));

        let err = search_images(State(failing_state()), Json(json!({ "searchPrompt": "crm" })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Failed to search images");

        let err = analyze_image(
            State(failing_state()),
            Json(json!({ "imageUrl": "https://img.test/a.png" })),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Failed to analyze image");
    }

    #[test]
    fn logged_provider_errors_are_redacted() {
        let err = ProviderError::Malformed {
            service: "Gemini",
            reason: "echoed ?key=AIzaSyA1234567890abcdefghijklmnopqrstu&alt=json".into(),
        };
        let logged = log_safe(&err);
        assert!(!logged.contains("AIzaSyA1234567890abcdefghijklmnopqrstu"));
        assert!(logged.contains("[REDACTED_KEY]"));

        let err = ProviderError::Rejected {
            url: "https://img.test/a.png?token=1".into(),
            reason: "sent Bearer sk-abcdefghijklmnopqrstuvwx".into(),
        };
        assert!(!log_safe(&err).contains("sk-abcdefghijklmnopqrstuvwx"));
    }

    #[tokio::test]
    async fn search_returns_images() {
        let Json(resp) = search_images(
            State(happy_state()),
            Json(json!({ "searchPrompt": "fintech dashboard UI" })),
        )
        .await
        .unwrap();
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(
            json,
            json!({ "images": [{ "url": "https://img.test/a.png", "description": "dark dashboard" }] })
        );
    }

    #[tokio::test]
    async fn analyze_sends_downloaded_bytes_and_renders() {
        let vision = Arc::new(MockVisionAnalyzer::new(DESIGN));
        let state = state_with(
            MockTextGenerator::new("unused"),
            MockImageSearch::new(vec![]),
            vision.clone(),
            MockImageSource::new("image/png", vec![1, 2, 3]),
        );
        let Json(resp) = analyze_image(
            State(state),
            Json(json!({ "imageUrl": "https://img.test/a.png" })),
        )
        .await
        .unwrap();

        assert_eq!(
            vision.last_image(),
            Some(ImageInput::Inline {
                mime_type: "image/png".into(),
                data: vec![1, 2, 3],
            })
        );
        assert_eq!(resp.design_prompt, DESIGN);
        assert_eq!(count_colors(&resp.document), 2);
        assert!(resp.html.contains("background-color:#111111"));

        let json = serde_json::to_value(&resp).unwrap();
        assert!(json.get("designPrompt").is_some());
    }

    #[tokio::test]
    async fn analyze_falls_back_to_url() {
        let vision = Arc::new(MockVisionAnalyzer::new(DESIGN));
        let state = state_with(
            MockTextGenerator::new("unused"),
            MockImageSearch::new(vec![]),
            vision.clone(),
            MockImageSource::unreachable(),
        );
        analyze_image(
            State(state),
            Json(json!({ "imageUrl": "https://img.test/a.png" })),
        )
        .await
        .unwrap();
        assert_eq!(
            vision.last_image(),
            Some(ImageInput::Url("https://img.test/a.png".into()))
        );
    }

    #[tokio::test]
    async fn render_annotates_short_hex() {
        let Json(resp) = render(Json(json!({ "markdown": "Accent #abc." })))
            .await
            .unwrap();
        assert_eq!(count_colors(&resp.document), 1);
        assert!(resp.html.contains("background-color:#aabbcc"));
        assert!(resp.html.contains("</span>#abc</span>"));
    }
}
