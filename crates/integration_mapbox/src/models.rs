//! Raw Mapbox API response shapes

use serde::Deserialize;

/// Geocoding response (`FeatureCollection`)
#[derive(Debug, Deserialize)]
pub(crate) struct GeocodingResponse {
    #[serde(default)]
    pub features: Vec<GeocodingFeature>,
}

/// One geocoding match
#[derive(Debug, Deserialize)]
pub(crate) struct GeocodingFeature {
    pub id: String,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// `[longitude, latitude]`
    #[serde(default)]
    pub center: Option<Vec<f64>>,
}

/// Directions response
#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsResponse {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DirectionsRoute {
    pub geometry: RouteGeometry,
    pub distance: f64,
    pub duration: f64,
}

/// `GeoJSON` `LineString`; positions are `[longitude, latitude]`
#[derive(Debug, Deserialize)]
pub(crate) struct RouteGeometry {
    #[serde(default)]
    pub coordinates: Vec<Vec<f64>>,
}
