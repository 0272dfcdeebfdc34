//! Accessible parking feed (ArcGIS feature service)
//!
//! Queries a fixed feature layer of mobility parking bays and turns each
//! point feature into an overlay point labelled with its street address.

use std::time::Duration;

use async_trait::async_trait;
use domain::{GeoPoint, OverlayKind, OverlayPoint};
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::ParkingFeedConfig;
use crate::error::{OverlayError, check_status};
use crate::models::{Feature, FeatureQueryResponse, attribute};

const ADDRESS_FIELDS: &[&str] = &["address", "street_address", "location", "street", "name"];
const SPACES_FIELDS: &[&str] = &["spaces", "num_spaces", "no_of_spaces", "bays", "capacity"];
const SIGN_FIELDS: &[&str] = &["sign_text", "signtext", "restriction", "sign", "description"];

/// Trait for accessible-parking feed clients
#[async_trait]
pub trait ParkingFeedClient: Send + Sync {
    /// Fetch all accessible parking points of the fixed region
    async fn fetch_parking(&self) -> Result<Vec<OverlayPoint>, OverlayError>;
}

/// ArcGIS REST feature-service client
#[derive(Debug)]
pub struct ArcGisParkingClient {
    client: Client,
    config: ParkingFeedConfig,
}

impl ArcGisParkingClient {
    /// Create a new parking feed client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &ParkingFeedConfig) -> Result<Self, OverlayError> {
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

    /// Normalize one feature; features without x/y are skipped
    fn convert_feature(feature: &Feature) -> Option<OverlayPoint> {
        let geometry = feature.geometry.as_ref()?;
        let location = GeoPoint::from_lon_lat(geometry.x?, geometry.y?).ok()?;

        let label = attribute(&feature.attributes, ADDRESS_FIELDS)
            .unwrap_or_else(|| OverlayKind::Parking.default_label().to_string());

        Some(
            OverlayPoint::new(location, label)
                .with_note(attribute(&feature.attributes, SIGN_FIELDS))
                .with_extra("spaces", attribute(&feature.attributes, SPACES_FIELDS)),
        )
    }

    /// Parse a raw query response body
    fn parse_response(body: &str) -> Result<Vec<OverlayPoint>, OverlayError> {
        let raw: FeatureQueryResponse =
            serde_json::from_str(body).map_err(|e| OverlayError::ParseError(e.to_string()))?;

        if let Some(error) = raw.error {
            return Err(OverlayError::FeedError(format!(
                "{} (code {})",
                error.message.unwrap_or_else(|| "unknown error".to_string()),
                error.code.unwrap_or_default()
            )));
        }

        let total = raw.features.len();
        let points: Vec<_> = raw
            .features
            .iter()
            .filter_map(Self::convert_feature)
            .collect();

        if points.len() < total {
            debug!(
                dropped = total - points.len(),
                "Skipped parking features without geometry"
            );
        }
        Ok(points)
    }
}

#[async_trait]
impl ParkingFeedClient for ArcGisParkingClient {
    #[instrument(skip(self))]
    async fn fetch_parking(&self) -> Result<Vec<OverlayPoint>, OverlayError> {
        let max_records = self.config.max_records.to_string();
        let params = [
            ("where", self.config.where_clause.as_str()),
            ("outFields", "*"),
            ("returnGeometry", "true"),
            ("outSR", "4326"),
            ("resultRecordCount", max_records.as_str()),
            ("f", "json"),
        ];

        debug!(url = %self.config.query_url, "Querying parking feature service");

        let response = self
            .client
            .get(&self.config.query_url)
            .query(&params)
            .send()
            .await
            .map_err(|e| OverlayError::from_transport(&e, self.config.timeout_secs))?;

        check_status(&response)?;

        let body = response
            .text()
            .await
            .map_err(|e| OverlayError::ParseError(e.to_string()))?;

        let points = Self::parse_response(&body).inspect_err(|e| {
            warn!(error = %e, "Parking feed returned an unusable response");
        })?;
        debug!(count = points.len(), "Parking points loaded");
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalizes_points() {
        let body = r#"{"features": [{
            "attributes": {"OBJECTID": 7, "Address": "Macquarie St, Sydney", "Spaces": 2, "Sign_Text": "4P Disabled only"},
            "geometry": {"x": 151.2125, "y": -33.8612}
        }]}"#;

        let points = ArcGisParkingClient::parse_response(body).unwrap();
        assert_eq!(points.len(), 1);
        let point = &points[0];
        assert_eq!(point.location, GeoPoint::new_unchecked(-33.8612, 151.2125));
        assert_eq!(point.label, "Macquarie St, Sydney");
        assert_eq!(point.note.as_deref(), Some("4P Disabled only"));
        assert_eq!(point.extra.get("spaces").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_parse_drops_features_without_geometry() {
        let body = r#"{"features": [
            {"attributes": {"Address": "No geometry"}},
            {"attributes": {"Address": "Null x"}, "geometry": {"x": null, "y": -33.86}},
            {"attributes": {"Address": "Out of range"}, "geometry": {"x": -33.86, "y": 151.2}},
            {"attributes": {}, "geometry": {"x": 151.2, "y": -33.87}}
        ]}"#;

        let points = ArcGisParkingClient::parse_response(body).unwrap();
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].label, "Accessible parking");
        assert!(points[0].note.is_none());
        assert!(points[0].extra.is_empty());
    }

    #[test]
    fn test_parse_surfaces_service_error() {
        let body = r#"{"error": {"code": 400, "message": "Cannot perform query. Invalid query parameters."}}"#;
        match ArcGisParkingClient::parse_response(body) {
            Err(OverlayError::FeedError(message)) => {
                assert!(message.contains("Invalid query parameters"));
                assert!(message.contains("400"));
            },
            other => panic!("expected FeedError, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            ArcGisParkingClient::parse_response("Service Unavailable"),
            Err(OverlayError::ParseError(_))
        ));
    }
}
