//! Canned providers for tests and offline runs.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::traits::{ImageInput, ImageResult, ImageSearch, ImageSource, TextGenerator, VisionAnalyzer};

fn mock_failure(service: &'static str, message: &str) -> ProviderError {
    ProviderError::Status {
        service,
        status: 503,
        body: message.to_string(),
    }
}

/// Returns a fixed reply, or fails with a 503 when built with `failing`.
pub struct MockTextGenerator {
    response: Result<String, String>,
    calls: AtomicUsize,
}

impl MockTextGenerator {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: Ok(response.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response
            .clone()
            .map_err(|m| mock_failure("mock", &m))
    }
}

pub struct MockImageSearch {
    response: Result<Vec<ImageResult>, String>,
}

impl MockImageSearch {
    pub fn new(images: Vec<ImageResult>) -> Self {
        Self { response: Ok(images) }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
        }
    }
}

#[async_trait]
impl ImageSearch for MockImageSearch {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_images(&self, _query: &str) -> Result<Vec<ImageResult>, ProviderError> {
        self.response
            .clone()
            .map_err(|m| mock_failure("mock", &m))
    }
}

/// Replies with fixed markdown and remembers the last image it was given.
pub struct MockVisionAnalyzer {
    response: Result<String, String>,
    last_image: std::sync::Mutex<Option<ImageInput>>,
}

impl MockVisionAnalyzer {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            response: Ok(markdown.into()),
            last_image: std::sync::Mutex::new(None),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            response: Err(message.into()),
            last_image: std::sync::Mutex::new(None),
        }
    }

    pub fn last_image(&self) -> Option<ImageInput> {
        self.last_image.lock().ok().and_then(|guard| guard.clone())
    }
}

#[async_trait]
impl VisionAnalyzer for MockVisionAnalyzer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn analyze(&self, _prompt: &str, image: &ImageInput) -> Result<String, ProviderError> {
        if let Ok(mut guard) = self.last_image.lock() {
            *guard = Some(image.clone());
        }
        self.response
            .clone()
            .map_err(|m| mock_failure("mock", &m))
    }
}

/// Serves fixed bytes, or refuses every URL when built with `unreachable`.
pub struct MockImageSource {
    image: Option<ImageInput>,
}

impl MockImageSource {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            image: Some(ImageInput::Inline {
                mime_type: mime_type.into(),
                data,
            }),
        }
    }

    pub fn unreachable() -> Self {
        Self { image: None }
    }
}

#[async_trait]
impl ImageSource for MockImageSource {
    async fn fetch(&self, url: &str) -> Result<ImageInput, ProviderError> {
        self.image.clone().ok_or_else(|| ProviderError::Rejected {
            url: url.to_string(),
            reason: "mock source is unreachable".to_string(),
        })
    }
}
