use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur within a [`PriceSource`](super::PriceSource)
/// implementation.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A transport-level failure (network error, timeout). Retryable.
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a retryable status (throttling, 5xx).
    #[error("Transient API status: {status}")]
    Transient {
        /// The HTTP status the provider returned.
        status: StatusCode,
    },

    /// The provider's API returned an error payload. Not retryable.
    #[error("API error: {0}")]
    Api(String),

    /// The request parameters were invalid for this specific provider.
    #[error("Invalid parameters for provider: {0}")]
    Validation(String),
}

impl FeedError {
    /// Whether a retry with the same request can reasonably succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, FeedError::Request(_) | FeedError::Transient { .. })
    }
}

/// Errors that can occur while constructing a provider.
#[derive(Debug, Error)]
pub enum ProviderInitError {
    /// The underlying HTTP client could not be built.
    #[error("HTTP client construction failed: {0}")]
    Client(#[from] reqwest::Error),
}
