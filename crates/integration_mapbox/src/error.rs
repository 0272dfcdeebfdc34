//! Mapbox error types

use reqwest::header::{HeaderMap, RETRY_AFTER};
use thiserror::Error;

/// Errors that can occur during geocoding
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// Connection to the geocoding service failed
    #[error("Geocoding connection failed: {0}")]
    ConnectionFailed(String),

    /// Geocoding request returned a non-success status
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the geocoding response
    #[error("Geocoding parse error: {0}")]
    ParseError(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Geocoding rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by the API)
        retry_after_secs: Option<u64>,
    },

    /// Request timeout
    #[error("Geocoding request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Invalid client configuration
    #[error("Geocoding configuration error: {0}")]
    ConfigurationError(String),
}

impl GeocodingError {
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
}

/// Errors that can occur during routing
#[derive(Debug, Error)]
pub enum DirectionsError {
    /// Connection to the directions service failed
    #[error("Directions connection failed: {0}")]
    ConnectionFailed(String),

    /// Directions request returned a non-success status
    #[error("Directions request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the directions response
    #[error("Directions parse error: {0}")]
    ParseError(String),

    /// The service answered but found no route
    #[error("No route found: {0}")]
    NoRoute(String),

    /// Rate limit exceeded (HTTP 429)
    #[error("Directions rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by the API)
        retry_after_secs: Option<u64>,
    },

    /// Request timeout
    #[error("Directions request timed out after {timeout_secs} seconds")]
    Timeout {
        /// The timeout duration in seconds
        timeout_secs: u64,
    },

    /// Invalid client configuration
    #[error("Directions configuration error: {0}")]
    ConfigurationError(String),
}

impl DirectionsError {
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
}

/// Parse the `Retry-After` header as whole seconds
pub(crate) fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}
