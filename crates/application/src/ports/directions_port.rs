//! Directions port

use async_trait::async_trait;
use domain::{GeoPoint, RouteResult};
#[cfg(test)]
use mockall::automock;

use crate::error::MapError;

/// Port for point-to-point routing
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirectionsPort: Send + Sync {
    /// Compute a route from `start` to `end`
    ///
    /// Returns a non-degraded [`RouteResult`] with the polyline in (lat, lon)
    /// order. A service that finds no route reports `MapError::Directions`.
    async fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<RouteResult, MapError>;
}
