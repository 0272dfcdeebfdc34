//! Read-only view model the presentation layer renders

use domain::{BoundingBox, EndpointRole, GeoPoint, OverlayKind, OverlayPoint, RouteResult};
use serde::Serialize;

use super::map_state::EndpointSelection;
use super::notice::Notice;

/// What a marker on the map represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "layer", rename_all = "snake_case")]
pub enum MarkerKind {
    /// Resolved route origin
    Start,
    /// Resolved route destination
    End,
    /// A point of an overlay layer
    Overlay(OverlayKind),
}

impl MarkerKind {
    /// Pin color used by the map view
    #[must_use]
    pub const fn pin_color(&self) -> &'static str {
        match self {
            Self::Start => "green",
            Self::End => "red",
            Self::Overlay(OverlayKind::Parking) => "blue",
            Self::Overlay(OverlayKind::Lift) => "purple",
            Self::Overlay(OverlayKind::Stairs) => "orange",
        }
    }
}

/// A single pin on the map
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    /// Pin position
    pub location: GeoPoint,
    /// Pin title
    pub title: String,
    /// Secondary text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// What the pin represents
    pub kind: MarkerKind,
}

/// Snapshot of one overlay layer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayLayerView {
    /// Layer identity
    pub layer: OverlayKind,
    /// Whether the user has the layer switched on
    pub enabled: bool,
    /// Whether a fetch is in flight
    pub loading: bool,
    /// Points of the last successful fetch (empty unless enabled)
    pub points: Vec<OverlayPoint>,
    /// Message of the last failed fetch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Everything the map screen needs to render
#[derive(Debug, Clone, Serialize)]
pub struct MapViewModel {
    /// Role the search box currently edits
    pub active_role: EndpointRole,
    /// Route origin selection
    pub start: EndpointSelection,
    /// Route destination selection
    pub end: EndpointSelection,
    /// Endpoint pins followed by overlay pins
    pub markers: Vec<MapMarker>,
    /// Current route, if both endpoints are resolved and routing completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub route: Option<RouteResult>,
    /// Whether a directions request is in flight
    pub route_loading: bool,
    /// Per-layer overlay state
    pub overlays: Vec<OverlayLayerView>,
    /// Visible map region
    pub viewport: BoundingBox,
    /// Undismissed notices, oldest first
    pub notices: Vec<Notice>,
}

impl MapViewModel {
    /// Selection of one role
    #[must_use]
    pub const fn endpoint(&self, role: EndpointRole) -> &EndpointSelection {
        match role {
            EndpointRole::Start => &self.start,
            EndpointRole::End => &self.end,
        }
    }

    /// View of one overlay layer
    #[must_use]
    pub fn overlay(&self, layer: OverlayKind) -> Option<&OverlayLayerView> {
        self.overlays.iter().find(|o| o.layer == layer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_colors_follow_map_legend() {
        assert_eq!(MarkerKind::Start.pin_color(), "green");
        assert_eq!(MarkerKind::End.pin_color(), "red");
        assert_eq!(MarkerKind::Overlay(OverlayKind::Lift).pin_color(), "purple");
    }
}
