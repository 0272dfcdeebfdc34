//! Raw feed response shapes

use serde::Deserialize;
use serde_json::{Map, Value};

/// ArcGIS feature service query response (`f=json`)
#[derive(Debug, Deserialize)]
pub(crate) struct FeatureQueryResponse {
    #[serde(default)]
    pub features: Vec<Feature>,
    /// Present instead of `features` when the service rejects the query
    #[serde(default)]
    pub error: Option<FeatureServiceError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeatureServiceError {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Feature {
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub geometry: Option<PointGeometry>,
}

/// Esri point geometry; with `outSR=4326`, `x` is longitude and `y` latitude
#[derive(Debug, Deserialize)]
pub(crate) struct PointGeometry {
    #[serde(default)]
    pub x: Option<f64>,
    #[serde(default)]
    pub y: Option<f64>,
}

/// Overpass API JSON response
#[derive(Debug, Deserialize)]
pub(crate) struct OverpassResponse {
    #[serde(default)]
    pub elements: Vec<OverpassElement>,
    /// Runtime error or warning reported by the server
    #[serde(default)]
    pub remark: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OverpassElement {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: u64,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    /// Centroid for ways when queried with `out center`
    #[serde(default)]
    pub center: Option<LatLon>,
    #[serde(default)]
    pub tags: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl OverpassElement {
    /// Node position, or the way's centre
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon, &self.center) {
            (Some(lat), Some(lon), _) => Some((lat, lon)),
            (_, _, Some(center)) => Some((center.lat, center.lon)),
            _ => None,
        }
    }

    /// Non-empty tag value
    pub fn tag(&self, key: &str) -> Option<String> {
        self.tags.get(key).and_then(value_to_string)
    }
}

/// Look up an attribute by any of several names, case-insensitively
pub(crate) fn attribute(attributes: &Map<String, Value>, names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .and_then(|(_, value)| value_to_string(value))
    })
}

/// Render a scalar JSON value; blank strings and nulls yield `None`
fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
