use std::sync::Arc;

use anyhow::{Context, Result};
use stylescout_config::StyleScoutConfig;
use stylescout_providers::{
    GeminiVisionAnalyzer, HttpImageFetcher, ImageSearch, ImageSource, OpenAiTextGenerator,
    TavilyImageSearch, TextGenerator, VisionAnalyzer,
};

/// Application state shared across routes.
#[derive(Clone)]
pub struct GatewayState {
    pub text: Arc<dyn TextGenerator>,
    pub search: Arc<dyn ImageSearch>,
    pub vision: Arc<dyn VisionAnalyzer>,
    pub images: Arc<dyn ImageSource>,
}

impl GatewayState {
    pub fn new(
        text: Arc<dyn TextGenerator>,
        search: Arc<dyn ImageSearch>,
        vision: Arc<dyn VisionAnalyzer>,
        images: Arc<dyn ImageSource>,
    ) -> Self {
        Self {
            text,
            search,
            vision,
            images,
        }
    }

    /// Wire the real upstream clients from a validated config.
    pub fn from_config(config: &StyleScoutConfig) -> Result<Self> {
        let openai_key = config.openai.api_key.as_ref().context("openai.apiKey is not set")?;
        let gemini_key = config.gemini.api_key.as_ref().context("gemini.apiKey is not set")?;
        let tavily_key = config.tavily.api_key.as_ref().context("tavily.apiKey is not set")?;

        let text = OpenAiTextGenerator::new(openai_key.expose(), config.openai.model())
            .with_base_url(config.openai.base_url());
        let search = TavilyImageSearch::new(tavily_key.expose())
            .with_base_url(config.tavily.base_url())
            .with_max_results(config.tavily.max_results());
        let vision = GeminiVisionAnalyzer::new(gemini_key.expose(), config.gemini.model())
            .with_base_url(config.gemini.base_url());

        Ok(Self::new(
            Arc::new(text),
            Arc::new(search),
            Arc::new(vision),
            Arc::new(HttpImageFetcher::new()?),
        ))
    }
}
