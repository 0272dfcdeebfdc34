//! Mapbox adapters - Implement GeocodingPort and DirectionsPort using integration_mapbox

use application::error::MapError;
use application::ports::{DirectionsPort, GeocodingPort};
use async_trait::async_trait;
use domain::{GeoPoint, PlaceCandidate, RouteResult};
use integration_mapbox::{
    DirectionsClient, DirectionsError, GeocodingClient, GeocodingError, MapboxConfig,
    MapboxDirectionsClient, MapboxGeocodingClient,
};
use tracing::{instrument, warn};

/// Adapter for place search using the Mapbox Geocoding API
pub struct MapboxGeocodingAdapter {
    client: MapboxGeocodingClient,
}

impl std::fmt::Debug for MapboxGeocodingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxGeocodingAdapter")
            .field("client", &"MapboxGeocodingClient")
            .finish()
    }
}

impl MapboxGeocodingAdapter {
    /// Wrap an existing client
    pub const fn new(client: MapboxGeocodingClient) -> Self {
        Self { client }
    }

    /// Build the adapter from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn from_config(config: &MapboxConfig) -> Result<Self, MapError> {
        let client = MapboxGeocodingClient::new(config)
            .map_err(|e| MapError::Configuration(e.to_string()))?;
        Ok(Self::new(client))
    }

    fn map_error(err: &GeocodingError) -> MapError {
        warn!(error = %err, retryable = err.is_retryable(), "Geocoding failed");
        MapError::Geocode(err.to_string())
    }
}

#[async_trait]
impl GeocodingPort for MapboxGeocodingAdapter {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, MapError> {
        self.client
            .search(query)
            .await
            .map_err(|e| Self::map_error(&e))
    }
}

/// Adapter for routing using the Mapbox Directions API
pub struct MapboxDirectionsAdapter {
    client: MapboxDirectionsClient,
}

impl std::fmt::Debug for MapboxDirectionsAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxDirectionsAdapter")
            .field("client", &"MapboxDirectionsClient")
            .finish()
    }
}

impl MapboxDirectionsAdapter {
    /// Wrap an existing client
    pub const fn new(client: MapboxDirectionsClient) -> Self {
        Self { client }
    }

    /// Build the adapter from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to initialize.
    pub fn from_config(config: &MapboxConfig) -> Result<Self, MapError> {
        let client = MapboxDirectionsClient::new(config)
            .map_err(|e| MapError::Configuration(e.to_string()))?;
        Ok(Self::new(client))
    }

    fn map_error(err: &DirectionsError) -> MapError {
        warn!(error = %err, retryable = err.is_retryable(), "Directions failed");
        match err {
            DirectionsError::NoRoute(reason) => MapError::NoRoute(reason.clone()),
            other => MapError::Directions(other.to_string()),
        }
    }
}

#[async_trait]
impl DirectionsPort for MapboxDirectionsAdapter {
    #[instrument(skip(self))]
    async fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<RouteResult, MapError> {
        self.client
            .route(start, end)
            .await
            .map_err(|e| Self::map_error(&e))
    }
}
