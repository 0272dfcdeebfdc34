//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Coordinates outside the valid latitude/longitude range
    #[error("Invalid coordinates: ({latitude}, {longitude})")]
    InvalidCoordinates {
        /// Rejected latitude
        latitude: f64,
        /// Rejected longitude
        longitude: f64,
    },

    /// Bounding box with out-of-range or inverted edges
    #[error("Invalid bounding box: {0}")]
    InvalidBoundingBox(String),

    /// Malformed textual input
    #[error("Parse error: {0}")]
    Parse(String),
}
