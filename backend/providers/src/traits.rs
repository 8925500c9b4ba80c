use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;

/// A single image search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResult {
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Image handed to a vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageInput {
    /// Downloaded bytes, sent inline.
    Inline { mime_type: String, data: Vec<u8> },
    /// Remote reference the model fetches itself.
    Url(String),
}

/// Text-generation model (turns an application idea into a search query).
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Complete a single user prompt and return the raw text.
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError>;
}

/// Web image search.
#[async_trait]
pub trait ImageSearch: Send + Sync {
    fn name(&self) -> &str;

    async fn search_images(&self, query: &str) -> Result<Vec<ImageResult>, ProviderError>;
}

/// Vision-capable model (turns a design image into markdown).
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    fn name(&self) -> &str;

    async fn analyze(&self, prompt: &str, image: &ImageInput) -> Result<String, ProviderError>;
}

/// Downloads an image so it can be sent inline.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<ImageInput, ProviderError>;
}
