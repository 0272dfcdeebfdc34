//! Bounding box value object used for viewport-scoped overlay queries

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::GeoPoint;
use crate::errors::DomainError;

/// An axis-aligned geographic bounding box (south/west/north/east in degrees)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

impl BoundingBox {
    /// Create a bounding box
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidBoundingBox` when an edge is out of range
    /// or `south > north` / `west > east`.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Result<Self, DomainError> {
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        let lon_ok = |v: f64| (-180.0..=180.0).contains(&v);
        if !(lat_ok(south) && lat_ok(north) && lon_ok(west) && lon_ok(east))
            || south > north
            || west > east
        {
            return Err(DomainError::InvalidBoundingBox(format!(
                "{south},{west},{north},{east}"
            )));
        }
        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }

    /// Build the box a map region covers: `center` plus full latitude/longitude spans
    ///
    /// Edges are clamped to the valid coordinate range.
    #[must_use]
    pub fn around(center: GeoPoint, latitude_delta: f64, longitude_delta: f64) -> Self {
        let half_lat = latitude_delta.abs() / 2.0;
        let half_lon = longitude_delta.abs() / 2.0;
        Self {
            south: (center.latitude() - half_lat).max(-90.0),
            west: (center.longitude() - half_lon).max(-180.0),
            north: (center.latitude() + half_lat).min(90.0),
            east: (center.longitude() + half_lon).min(180.0),
        }
    }

    /// Southern edge
    #[must_use]
    pub const fn south(&self) -> f64 {
        self.south
    }

    /// Western edge
    #[must_use]
    pub const fn west(&self) -> f64 {
        self.west
    }

    /// Northern edge
    #[must_use]
    pub const fn north(&self) -> f64 {
        self.north
    }

    /// Eastern edge
    #[must_use]
    pub const fn east(&self) -> f64 {
        self.east
    }

    /// Centre point of the box
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint::new_unchecked(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Whether the point lies inside the box (edges inclusive)
    #[must_use]
    pub fn contains(&self, point: &GeoPoint) -> bool {
        (self.south..=self.north).contains(&point.latitude())
            && (self.west..=self.east).contains(&point.longitude())
    }
}

/// Formats as `south,west,north,east`, the order Overpass QL expects
impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.south, self.west, self.north, self.east)
    }
}

impl FromStr for BoundingBox {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| DomainError::Parse(format!("invalid bounding box '{s}'")))?;

        match parts.as_slice() {
            [south, west, north, east] => Self::new(*south, *west, *north, *east),
            _ => Err(DomainError::Parse(format!(
                "expected 'south,west,north,east', got '{s}'"
            ))),
        }
    }
}
