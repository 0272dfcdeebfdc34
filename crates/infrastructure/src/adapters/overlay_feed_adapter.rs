//! Overlay feed adapter - Implements OverlayFeedPort using integration_overlays
//!
//! Dispatches each layer to its backend: parking to the ArcGIS feature
//! service (fixed region), lifts and stairs to Overpass (viewport region).

use std::sync::Arc;

use application::error::MapError;
use application::ports::OverlayFeedPort;
use async_trait::async_trait;
use domain::{BoundingBox, OverlayKind, OverlayPoint};
use integration_overlays::{
    ArcGisParkingClient, OsmFeatureClient, OverlayError, OverpassClient, OverpassConfig,
    ParkingFeedClient, ParkingFeedConfig,
};
use tracing::{debug, instrument, warn};

/// Adapter combining the parking and OpenStreetMap feeds
pub struct OverlayFeedAdapter {
    parking: Arc<dyn ParkingFeedClient>,
    osm: Arc<dyn OsmFeatureClient>,
}

impl std::fmt::Debug for OverlayFeedAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayFeedAdapter").finish_non_exhaustive()
    }
}

impl OverlayFeedAdapter {
    /// Create an adapter over existing clients
    pub fn new(parking: Arc<dyn ParkingFeedClient>, osm: Arc<dyn OsmFeatureClient>) -> Self {
        Self { parking, osm }
    }

    /// Build the adapter from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client fails to initialize.
    pub fn from_config(
        parking: &ParkingFeedConfig,
        overpass: &OverpassConfig,
    ) -> Result<Self, MapError> {
        let parking = ArcGisParkingClient::new(parking)
            .map_err(|e| MapError::Configuration(e.to_string()))?;
        let osm =
            OverpassClient::new(overpass).map_err(|e| MapError::Configuration(e.to_string()))?;
        Ok(Self::new(Arc::new(parking), Arc::new(osm)))
    }
}

#[async_trait]
impl OverlayFeedPort for OverlayFeedAdapter {
    #[instrument(skip(self, region))]
    async fn fetch(
        &self,
        layer: OverlayKind,
        region: &BoundingBox,
    ) -> Result<Vec<OverlayPoint>, MapError> {
        let result = match layer {
            OverlayKind::Parking => self.parking.fetch_parking().await,
            OverlayKind::Lift => self.osm.fetch_lifts(region).await,
            OverlayKind::Stairs => self.osm.fetch_stairs(region).await,
        };

        result
            .inspect(|points| debug!(count = points.len(), "Overlay feed returned points"))
            .map_err(|e: OverlayError| {
                warn!(%layer, error = %e, "Overlay feed failed");
                MapError::overlay(layer, e.to_string())
            })
    }
}
