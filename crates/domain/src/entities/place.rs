//! Place search results and quick-location presets

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::GeoPoint;

/// A ranked place returned by a geocoding search
///
/// Ephemeral: the map state drops candidates once one is chosen or the
/// query that produced them is invalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    /// Provider-assigned identifier, stable within one result list
    pub id: String,
    /// Human-readable place name
    pub label: String,
    /// Position of the place
    pub location: GeoPoint,
}

impl PlaceCandidate {
    /// Create a new candidate
    #[must_use]
    pub fn new(id: impl Into<String>, label: impl Into<String>, location: GeoPoint) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            location,
        }
    }
}

impl fmt::Display for PlaceCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.location)
    }
}

/// A fixed landmark the user can pick without searching
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuickLocation {
    /// Landmark name
    pub name: &'static str,
    /// Landmark position
    pub location: GeoPoint,
}

/// Sydney landmarks offered as one-tap endpoints
pub const QUICK_LOCATIONS: [QuickLocation; 5] = [
    QuickLocation {
        name: "Sydney Opera House",
        location: GeoPoint::new_unchecked(-33.8568, 151.2153),
    },
    QuickLocation {
        name: "Sydney Harbour Bridge",
        location: GeoPoint::new_unchecked(-33.8523, 151.2108),
    },
    QuickLocation {
        name: "Circular Quay",
        location: GeoPoint::new_unchecked(-33.8599, 151.2111),
    },
    QuickLocation {
        name: "Darling Harbour",
        location: GeoPoint::new_unchecked(-33.8688, 151.2018),
    },
    QuickLocation {
        name: "Central Station",
        location: GeoPoint::new_unchecked(-33.8839, 151.2065),
    },
];

impl QuickLocation {
    /// Look up a preset by name (case-insensitive)
    #[must_use]
    pub fn find(name: &str) -> Option<Self> {
        let name = name.trim();
        QUICK_LOCATIONS
            .iter()
            .find(|q| q.name.eq_ignore_ascii_case(name))
            .copied()
    }
}
