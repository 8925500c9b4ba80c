use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProviderError, check_status};
use crate::traits::{ImageResult, ImageSearch};

const SERVICE: &str = "tavily";

/// Tavily web search, used for its image results only.
pub struct TavilyImageSearch {
    client: Client,
    api_key: String,
    base_url: String,
    max_results: u32,
}

impl TavilyImageSearch {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.tavily.com".to_string(),
            max_results: 20,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_max_results(mut self, max_results: u32) -> Self {
        self.max_results = max_results;
        self
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    include_images: bool,
    include_image_descriptions: bool,
    max_results: u32,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    images: Vec<RawImage>,
}

/// Images come back as objects when descriptions are requested and as
/// bare URLs otherwise.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawImage {
    Described {
        url: String,
        #[serde(default)]
        description: Option<String>,
    },
    Bare(String),
}

impl From<RawImage> for ImageResult {
    fn from(raw: RawImage) -> Self {
        match raw {
            RawImage::Described { url, description } => ImageResult {
                url,
                description: description.unwrap_or_default(),
            },
            RawImage::Bare(url) => ImageResult {
                url,
                description: String::new(),
            },
        }
    }
}

fn parse_response(response: SearchResponse) -> Vec<ImageResult> {
    response.images.into_iter().map(ImageResult::from).collect()
}

#[async_trait]
impl ImageSearch for TavilyImageSearch {
    fn name(&self) -> &str {
        SERVICE
    }

    async fn search_images(&self, query: &str) -> Result<Vec<ImageResult>, ProviderError> {
        debug!(max_results = self.max_results, "Searching Tavily for images");

        let body = SearchRequest {
            query,
            include_images: true,
            include_image_descriptions: true,
            max_results: self.max_results,
        };
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(ProviderError::fetch(SERVICE))?;

        let response = check_status(SERVICE, response).await?;
        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::malformed(SERVICE, e.to_string()))?;
        Ok(parse_response(body))
    }
}
