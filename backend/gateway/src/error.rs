//! API error taxonomy and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use stylescout_providers::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// A required body field was absent, not a string, or empty.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// An upstream call failed. The cause is logged, never returned.
    #[error("Failed to {operation}")]
    Upstream {
        operation: &'static str,
        #[source]
        source: ProviderError,
    },
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingField(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
