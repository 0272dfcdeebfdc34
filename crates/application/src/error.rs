//! Application-level errors
//!
//! Every external-call failure of the map screen is recovered at the
//! component that produced it; none of these is fatal to the screen.

use domain::{DomainError, OverlayKind};
use thiserror::Error;

/// Errors surfaced by the map screen's ports and coordinator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Geocoding search failed (network error, non-2xx status, bad payload)
    #[error("Geocoding failed: {0}")]
    Geocode(String),

    /// Directions lookup failed
    #[error("Directions failed: {0}")]
    Directions(String),

    /// The directions service answered but found no route between the points
    #[error("No route found: {0}")]
    NoRoute(String),

    /// An overlay layer's feed could not be fetched
    #[error("{layer} overlay fetch failed: {message}")]
    OverlayFetch {
        /// The layer that failed
        layer: OverlayKind,
        /// Failure detail
        message: String,
    },

    /// The user denied access to the device location
    #[error("Location permission denied")]
    LocationPermission,

    /// A location fix could not be obtained
    #[error("Location unavailable: {0}")]
    LocationUnavailable(String),

    /// The chosen candidate or preset does not exist
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl MapError {
    /// Create an overlay fetch error for a layer
    pub fn overlay(layer: OverlayKind, message: impl Into<String>) -> Self {
        Self::OverlayFetch {
            layer,
            message: message.into(),
        }
    }

    /// Whether retrying the triggering action may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Geocode(_)
                | Self::Directions(_)
                | Self::OverlayFetch { .. }
                | Self::LocationUnavailable(_)
        )
    }
}
