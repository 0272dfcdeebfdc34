//! Accessibility overlay layers and their normalized points

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::value_objects::GeoPoint;

/// The independently toggled accessibility layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayKind {
    /// Accessible parking bays
    Parking,
    /// Lifts and elevators
    Lift,
    /// Stairs and steps
    Stairs,
}

impl OverlayKind {
    /// All layers in display order
    pub const ALL: [Self; 3] = [Self::Parking, Self::Lift, Self::Stairs];

    /// Human-readable layer name
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Parking => "Accessible parking",
            Self::Lift => "Lifts",
            Self::Stairs => "Stairs",
        }
    }

    /// Label used for points that carry no name of their own
    #[must_use]
    pub const fn default_label(&self) -> &'static str {
        match self {
            Self::Parking => "Accessible parking",
            Self::Lift => "Lift",
            Self::Stairs => "Stairs",
        }
    }

    /// Whether the layer's backend query is scoped to the map viewport
    #[must_use]
    pub const fn uses_viewport(&self) -> bool {
        !matches!(self, Self::Parking)
    }

    /// Parse from a user-supplied string (case-insensitive, singular or plural)
    #[must_use]
    pub fn from_config(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "parking" => Some(Self::Parking),
            "lift" | "lifts" | "elevator" | "elevators" => Some(Self::Lift),
            "stairs" | "steps" => Some(Self::Stairs),
            _ => None,
        }
    }
}

impl fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// A single overlay feature normalized from its backend's shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayPoint {
    /// Feature position
    pub location: GeoPoint,
    /// Display label (feature name or the layer's default)
    pub label: String,
    /// Secondary text such as sign text, operator or incline
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Optional backend-specific attributes (e.g. `spaces`, `wheelchair`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl OverlayPoint {
    /// Create a point with a label and no metadata
    #[must_use]
    pub fn new(location: GeoPoint, label: impl Into<String>) -> Self {
        Self {
            location,
            label: label.into(),
            note: None,
            extra: BTreeMap::new(),
        }
    }

    /// Attach a note (ignored when `None` or blank)
    #[must_use]
    pub fn with_note(mut self, note: Option<String>) -> Self {
        self.note = note.filter(|n| !n.trim().is_empty());
        self
    }

    /// Attach an optional attribute (ignored when `None`)
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: Option<String>) -> Self {
        if let Some(value) = value {
            self.extra.insert(key.into(), value);
        }
        self
    }
}
