use thiserror::Error;

/// Failure talking to an upstream service.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{service} request failed: {source}")]
    Fetch {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected {service} response: {reason}")]
    Malformed {
        service: &'static str,
        reason: String,
    },

    #[error("refused to fetch {url}: {reason}")]
    Rejected { url: String, reason: String },
}

impl ProviderError {
    pub(crate) fn fetch(service: &'static str) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| ProviderError::Fetch { service, source }
    }

    pub(crate) fn malformed(service: &'static str, reason: impl Into<String>) -> Self {
        ProviderError::Malformed {
            service,
            reason: reason.into(),
        }
    }
}

/// Turns a non-success response into `ProviderError::Status`.
pub(crate) async fn check_status(
    service: &'static str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        service,
        status: status.as_u16(),
        body,
    })
}
