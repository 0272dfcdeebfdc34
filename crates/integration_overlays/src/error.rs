//! Overlay feed error types

use thiserror::Error;

/// Errors that can occur while fetching an overlay feed
#[derive(Debug, Error)]
pub enum OverlayError {
    /// Connection to the feed failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Feed request returned a non-success status
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the feed response
    #[error("Parse error: {0}")]
    ParseError(String),

    /// The feed reported an error inside a success response
    #[error("Feed error: {0}")]
    FeedError(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by the API)
        retry_after_secs: Option<u64>,
    },

    /// Request timeout
    #[error("Request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Invalid client configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl OverlayError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::RequestFailed(_)
                | Self::Timeout { .. }
                | Self::RateLimitExceeded { .. }
        )
    }

    /// Map a transport error, distinguishing timeouts
    pub(crate) fn from_transport(err: &reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            Self::Timeout { timeout_secs }
        } else {
            Self::ConnectionFailed(err.to_string())
        }
    }
}

/// Turn a non-success response into the matching error
pub(crate) fn check_status(response: &reqwest::Response) -> Result<(), OverlayError> {
    let status = response.status();
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(OverlayError::RateLimitExceeded {
            retry_after_secs: response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse().ok()),
        });
    }
    if !status.is_success() {
        return Err(OverlayError::RequestFailed(format!("HTTP {status}")));
    }
    Ok(())
}
