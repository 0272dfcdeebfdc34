//! Lifts and stairs from OpenStreetMap (Overpass API)
//!
//! Lifts are `highway=elevator` nodes and ways; stairs are `highway=steps`
//! ways, located by their centre (`out center`).

use std::time::Duration;

use async_trait::async_trait;
use domain::{BoundingBox, GeoPoint, OverlayKind, OverlayPoint};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::OverpassConfig;
use crate::error::{OverlayError, check_status};
use crate::models::{OverpassElement, OverpassResponse};

/// Trait for OpenStreetMap feature clients
#[async_trait]
pub trait OsmFeatureClient: Send + Sync {
    /// Fetch lifts inside `region`
    async fn fetch_lifts(&self, region: &BoundingBox) -> Result<Vec<OverlayPoint>, OverlayError>;

    /// Fetch stairs inside `region`
    async fn fetch_stairs(&self, region: &BoundingBox) -> Result<Vec<OverlayPoint>, OverlayError>;
}

/// OpenStreetMap feature family served by this client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OsmLayer {
    Lifts,
    Stairs,
}

impl OsmLayer {
    const fn kind(self) -> OverlayKind {
        match self {
            Self::Lifts => OverlayKind::Lift,
            Self::Stairs => OverlayKind::Stairs,
        }
    }
}

/// Overpass API client
#[derive(Debug)]
pub struct OverpassClient {
    client: Client,
    config: OverpassConfig,
}

impl OverpassClient {
    /// Create a new Overpass client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &OverpassConfig) -> Result<Self, OverlayError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("AccessibleRouteApp/1.0")
            .build()
            .map_err(|e| OverlayError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Build the Overpass QL query for a layer
    fn build_query(&self, layer: OsmLayer, region: &BoundingBox) -> String {
        let bbox = format!(
            "{},{},{},{}",
            region.south(),
            region.west(),
            region.north(),
            region.east()
        );
        let header = format!("[out:json][timeout:{}];", self.config.timeout_secs);

        match layer {
            OsmLayer::Lifts => format!(
                "{header}(node[\"highway\"=\"elevator\"]({bbox});way[\"highway\"=\"elevator\"]({bbox}););out center;"
            ),
            OsmLayer::Stairs => {
                format!("{header}way[\"highway\"=\"steps\"]({bbox});out center;")
            },
        }
    }

    /// Normalize one element for `layer`; elements without a position are
    /// skipped
    fn convert_element(layer: OsmLayer, element: &OverpassElement) -> Option<OverlayPoint> {
        let (latitude, longitude) = element.position()?;
        let location = GeoPoint::new(latitude, longitude).ok()?;

        let label = element
            .tag("name")
            .or_else(|| element.tag("ref"))
            .unwrap_or_else(|| layer.kind().default_label().to_string());

        let point = OverlayPoint::new(location, label)
            .with_extra("osm_id", Some(format!("{}/{}", element.kind, element.id)))
            .with_extra("wheelchair", element.tag("wheelchair"));

        let point = match layer {
            OsmLayer::Stairs => point
                .with_note(element.tag("incline").or_else(|| element.tag("description")))
                .with_extra("step_count", element.tag("step_count"))
                .with_extra("handrail", element.tag("handrail")),
            OsmLayer::Lifts => point
                .with_note(element.tag("operator").or_else(|| element.tag("description")))
                .with_extra("level", element.tag("level")),
        };
        Some(point)
    }

    /// Parse a raw Overpass response body
    fn parse_response(layer: OsmLayer, body: &str) -> Result<Vec<OverlayPoint>, OverlayError> {
        let raw: OverpassResponse =
            serde_json::from_str(body).map_err(|e| OverlayError::ParseError(e.to_string()))?;

        if let Some(remark) = raw.remark.as_deref() {
            if remark.contains("error") {
                return Err(OverlayError::FeedError(remark.to_string()));
            }
            warn!(layer = %layer.kind(), %remark, "Overpass returned a remark");
        }

        let total = raw.elements.len();
        let points: Vec<_> = raw
            .elements
            .iter()
            .filter_map(|element| Self::convert_element(layer, element))
            .collect();

        if points.len() < total {
            debug!(
                layer = %layer.kind(),
                dropped = total - points.len(),
                "Skipped Overpass elements without coordinates"
            );
        }
        Ok(points)
    }

    #[instrument(skip(self, region), fields(region = %region))]
    async fn fetch(
        &self,
        layer: OsmLayer,
        region: &BoundingBox,
    ) -> Result<Vec<OverlayPoint>, OverlayError> {
        let query = self.build_query(layer, region);
        debug!(%query, "Querying Overpass");

        let response = self
            .client
            .post(self.config.interpreter_url())
            .form(&[("data", query.as_str())])
            .send()
            .await
            .map_err(|e| OverlayError::from_transport(&e, self.config.timeout_secs))?;

        check_status(&response)?;

        let body = response
            .text()
            .await
            .map_err(|e| OverlayError::ParseError(e.to_string()))?;

        let points = Self::parse_response(layer, &body)?;
        debug!(count = points.len(), "Overpass points loaded");
        Ok(points)
    }
}

#[async_trait]
impl OsmFeatureClient for OverpassClient {
    async fn fetch_lifts(&self, region: &BoundingBox) -> Result<Vec<OverlayPoint>, OverlayError> {
        self.fetch(OsmLayer::Lifts, region).await
    }

    async fn fetch_stairs(&self, region: &BoundingBox) -> Result<Vec<OverlayPoint>, OverlayError> {
        self.fetch(OsmLayer::Stairs, region).await
    }
}
