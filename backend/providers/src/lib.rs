//! Upstream service clients for StyleScout.
//!
//! One trait per external collaborator (text generation, image search,
//! vision analysis, image download) with a reqwest implementation each and
//! canned mocks for tests.

pub mod error;
pub mod gemini;
pub mod image_fetch;
pub mod mock;
pub mod openai;
pub mod prompts;
pub mod tavily;
pub mod traits;

pub use error::ProviderError;
pub use gemini::GeminiVisionAnalyzer;
pub use image_fetch::{HttpImageFetcher, MAX_IMAGE_BYTES, check_fetchable, guess_mime_type, is_blocked_ip};
pub use openai::OpenAiTextGenerator;
pub use tavily::TavilyImageSearch;
pub use traits::{ImageInput, ImageResult, ImageSearch, ImageSource, TextGenerator, VisionAnalyzer};
