//! Geographic point value object

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// A geographic point with latitude and longitude in degrees
///
/// Equality is by value. Transport formats that carry `[lon, lat]` pairs are
/// normalized at the client boundary via [`GeoPoint::from_lon_lat`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
}

impl GeoPoint {
    /// Create a new point with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if latitude is not in [-90, 90]
    /// or longitude is not in [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(DomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a point without validation (for trusted constants)
    #[must_use]
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Build a point from a `[lon, lat]` ordered pair
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` when the pair is out of range.
    pub fn from_lon_lat(longitude: f64, latitude: f64) -> Result<Self, DomainError> {
        Self::new(latitude, longitude)
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to another point in kilometers (Haversine)
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;

        let lat1_rad = self.latitude.to_radians();
        let lat2_rad = other.latitude.to_radians();
        let delta_lat = (other.latitude - self.latitude).to_radians();
        let delta_lon = (other.longitude - self.longitude).to_radians();

        let a = (lat1_rad.cos() * lat2_rad.cos()).mul_add(
            (delta_lon / 2.0).sin().powi(2),
            (delta_lat / 2.0).sin().powi(2),
        );
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Sydney CBD, the default map centre
    #[must_use]
    pub const fn sydney() -> Self {
        Self::new_unchecked(-33.8688, 151.2093)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Parses `"lat,lon"` (whitespace around either number is ignored)
impl FromStr for GeoPoint {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| DomainError::Parse(format!("expected 'lat,lon', got '{s}'")))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| DomainError::Parse(format!("invalid latitude '{lat}'")))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| DomainError::Parse(format!("invalid longitude '{lon}'")))?;
        Self::new(latitude, longitude)
    }
}
