//! Geocoding port
//!
//! Turns free text into ranked place candidates. Adapters bias results to a
//! fixed country and cap the number of candidates.

use async_trait::async_trait;
use domain::PlaceCandidate;
#[cfg(test)]
use mockall::automock;

use crate::error::MapError;

/// Port for free-text place search
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Search for places matching `query`
    ///
    /// Callers only invoke this for queries of at least three characters.
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, MapError>;
}
