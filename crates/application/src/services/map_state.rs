//! Map screen state machine
//!
//! All mutable state of the map screen lives in [`MapState`]: the two endpoint
//! selections, the route, the three overlay layers, the viewport and pending
//! notices. Every mutation goes through a method here so the stale-route
//! invariant is enforced in one place: whenever an endpoint's resolved
//! location changes, the route is cleared and its version bumped before any
//! new route is requested.
//!
//! Asynchronous work is split into a *begin* step that hands out a ticket and
//! an *apply* step that consumes it. A ticket whose sequence number, route
//! version or layer generation is no longer current is discarded, so results
//! are applied in issue order no matter in which order they complete.

use domain::{
    BoundingBox, EndpointRole, GeoPoint, OverlayKind, OverlayPoint, PlaceCandidate, RouteResult,
};
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::map_view::{MapMarker, MapViewModel, MarkerKind, OverlayLayerView};
use super::notice::{Notice, NoticeSource};
use crate::error::MapError;

/// Queries shorter than this (after trimming) never reach the geocoder
pub const MIN_QUERY_CHARS: usize = 3;

/// Label given to an endpoint set from the device location
pub const CURRENT_LOCATION_LABEL: &str = "Current location";

/// Latitude span of the region shown around a centre point
pub const REGION_LATITUDE_DELTA: f64 = 0.0922;

/// Longitude span of the region shown around a centre point
pub const REGION_LONGITUDE_DELTA: f64 = 0.0421;

/// Lifecycle phase of one endpoint role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointPhase {
    /// No usable query and no location
    #[default]
    Empty,
    /// A geocoding request is in flight
    Searching,
    /// Zero or several candidates are waiting for a pick
    CandidatesShown,
    /// The role has a location
    Resolved,
    /// The last search failed; shown like an empty candidate list
    Failed,
}

/// Search box, candidates and resolved location of one role
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EndpointSelection {
    query: String,
    resolved: Option<GeoPoint>,
    candidates: Vec<PlaceCandidate>,
    phase: EndpointPhase,
    #[serde(skip)]
    latest_seq: u64,
}

impl EndpointSelection {
    /// Current search text
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Resolved location, if any
    #[must_use]
    pub const fn resolved(&self) -> Option<GeoPoint> {
        self.resolved
    }

    /// Candidates awaiting a pick
    #[must_use]
    pub fn candidates(&self) -> &[PlaceCandidate] {
        &self.candidates
    }

    /// Lifecycle phase
    #[must_use]
    pub const fn phase(&self) -> EndpointPhase {
        self.phase
    }

    /// Whether a search is in flight
    #[must_use]
    pub fn is_searching(&self) -> bool {
        self.phase == EndpointPhase::Searching
    }

    /// Forget everything and invalidate in-flight searches
    fn clear(&mut self) {
        self.latest_seq += 1;
        self.query.clear();
        self.resolved = None;
        self.candidates.clear();
        self.phase = EndpointPhase::Empty;
    }
}

/// Handle for an in-flight geocoding request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    /// Role the search belongs to
    pub role: EndpointRole,
    /// Per-role sequence number at issue time
    pub seq: u64,
    /// Trimmed query to send
    pub query: String,
}

/// Handle for an in-flight device location request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocateTicket {
    /// Role the fix is for
    pub role: EndpointRole,
    /// Per-role sequence number at issue time
    pub seq: u64,
}

/// Handle for an in-flight directions request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteTicket {
    /// Endpoint-pair version at issue time
    pub version: u64,
    /// Resolved origin
    pub start: GeoPoint,
    /// Resolved destination
    pub end: GeoPoint,
}

/// Handle for an in-flight overlay fetch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayTicket {
    /// Layer being fetched
    pub layer: OverlayKind,
    /// Layer generation at issue time
    pub generation: u64,
    /// Region to query
    pub region: BoundingBox,
}

/// Result of applying a geocoding response
#[derive(Debug, Clone, PartialEq)]
pub enum SearchApplied {
    /// A newer search for the role superseded this one
    Stale,
    /// Exactly one candidate: the role resolved; carries the route to compute
    Resolved(Option<RouteTicket>),
    /// Zero or several candidates stored for the user to pick from
    Candidates(usize),
    /// The search failed; candidates cleared and a notice raised
    Failed(MapError),
}

/// Result of applying a device location fix
#[derive(Debug, Clone, PartialEq)]
pub enum LocationApplied {
    /// A newer search or selection for the role superseded this request
    Stale,
    /// The role resolved to the fix; carries the route to compute
    Resolved(Option<RouteTicket>),
    /// No fix; the role is untouched and a notice raised
    Failed(MapError),
}

/// Result of applying a directions response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteApplied {
    /// The endpoint pair changed since the request was issued
    Stale,
    /// A service route was stored
    Routed,
    /// The straight-line fallback was stored
    Fallback,
}

/// Result of applying an overlay response
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayApplied {
    /// The layer was toggled since the request was issued
    Stale,
    /// Points stored
    Loaded(usize),
    /// Fetch failed; error recorded and a notice raised
    Failed(MapError),
}

/// Lifecycle of one overlay layer
///
/// Points exist only in `Loaded`, which is only reachable while the layer
/// is enabled.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum OverlayState {
    /// Switched off
    #[default]
    Disabled,
    /// Switched on, fetch in flight
    Loading,
    /// Switched on, last fetch succeeded
    Loaded(Vec<OverlayPoint>),
    /// Switched on, last fetch failed
    Failed(MapError),
}

impl OverlayState {
    /// Whether the layer is switched on
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }

    /// Points to draw
    #[must_use]
    pub fn points(&self) -> &[OverlayPoint] {
        match self {
            Self::Loaded(points) => points,
            _ => &[],
        }
    }

    /// Error of the last fetch
    #[must_use]
    pub const fn last_error(&self) -> Option<&MapError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct OverlaySlot {
    state: OverlayState,
    generation: u64,
}

const fn slot_index(layer: OverlayKind) -> usize {
    match layer {
        OverlayKind::Parking => 0,
        OverlayKind::Lift => 1,
        OverlayKind::Stairs => 2,
    }
}

/// Consolidated state of the map screen
#[derive(Debug, Clone)]
pub struct MapState {
    start: EndpointSelection,
    end: EndpointSelection,
    active_role: EndpointRole,
    route: Option<RouteResult>,
    route_loading: bool,
    route_version: u64,
    overlays: [OverlaySlot; 3],
    viewport: BoundingBox,
    notices: Vec<Notice>,
}

impl MapState {
    /// Fresh state: both roles empty, no route, all layers off
    #[must_use]
    pub fn new(viewport: BoundingBox) -> Self {
        Self {
            start: EndpointSelection::default(),
            end: EndpointSelection::default(),
            active_role: EndpointRole::Start,
            route: None,
            route_loading: false,
            route_version: 0,
            overlays: Default::default(),
            viewport,
            notices: Vec::new(),
        }
    }

    // ------------------------------------------------------------------
    // Endpoints
    // ------------------------------------------------------------------

    /// Selection of one role
    #[must_use]
    pub const fn endpoint(&self, role: EndpointRole) -> &EndpointSelection {
        match role {
            EndpointRole::Start => &self.start,
            EndpointRole::End => &self.end,
        }
    }

    fn endpoint_mut(&mut self, role: EndpointRole) -> &mut EndpointSelection {
        match role {
            EndpointRole::Start => &mut self.start,
            EndpointRole::End => &mut self.end,
        }
    }

    /// Role the search box edits
    #[must_use]
    pub const fn active_role(&self) -> EndpointRole {
        self.active_role
    }

    /// Switch the edited role
    pub fn set_active_role(&mut self, role: EndpointRole) {
        self.active_role = role;
    }

    /// Flip the edited role and return the new one
    pub fn toggle_active_role(&mut self) -> EndpointRole {
        self.active_role = self.active_role.other();
        self.active_role
    }

    /// Record new search text for `role`
    ///
    /// Editing the text unresolves the role (clearing any route) and
    /// supersedes in-flight searches. Returns a ticket when the trimmed text
    /// is long enough to search; shorter text just clears the candidates.
    pub fn begin_search(&mut self, role: EndpointRole, text: &str) -> Option<SearchTicket> {
        let endpoint = self.endpoint_mut(role);
        let was_resolved = endpoint.resolved.take().is_some();
        endpoint.latest_seq += 1;
        endpoint.query = text.to_string();
        endpoint.candidates.clear();

        let query = text.trim();
        let ticket = if query.chars().count() < MIN_QUERY_CHARS {
            endpoint.phase = EndpointPhase::Empty;
            None
        } else {
            endpoint.phase = EndpointPhase::Searching;
            Some(SearchTicket {
                role,
                seq: endpoint.latest_seq,
                query: query.to_string(),
            })
        };

        if was_resolved {
            self.invalidate_route();
        }
        ticket
    }

    /// Apply a geocoding response for `ticket`
    pub fn apply_search(
        &mut self,
        ticket: &SearchTicket,
        result: Result<Vec<PlaceCandidate>, MapError>,
    ) -> SearchApplied {
        let role = ticket.role;
        let endpoint = self.endpoint_mut(role);
        if endpoint.latest_seq != ticket.seq {
            debug!(
                %role,
                seq = ticket.seq,
                latest = endpoint.latest_seq,
                "Discarding stale geocoding response"
            );
            return SearchApplied::Stale;
        }

        match result {
            Ok(mut candidates) if candidates.len() == 1 => {
                let candidate = candidates.remove(0);
                debug!(%role, label = %candidate.label, "Single candidate, auto-resolving");
                SearchApplied::Resolved(self.resolve(role, candidate.location))
            },
            Ok(candidates) => {
                let count = candidates.len();
                endpoint.candidates = candidates;
                endpoint.phase = EndpointPhase::CandidatesShown;
                SearchApplied::Candidates(count)
            },
            Err(err) => {
                warn!(%role, error = %err, "Geocoding failed");
                endpoint.candidates.clear();
                endpoint.phase = EndpointPhase::Failed;
                self.push_notice(Notice::warning(
                    NoticeSource::Search(role),
                    "Search Error",
                    "Unable to search locations. Please try again.",
                ));
                SearchApplied::Failed(err)
            },
        }
    }

    /// Resolve `role` to the candidate with `candidate_id`
    ///
    /// # Errors
    ///
    /// Returns `MapError::InvalidSelection` when no shown candidate has that id.
    pub fn select_candidate(
        &mut self,
        role: EndpointRole,
        candidate_id: &str,
    ) -> Result<Option<RouteTicket>, MapError> {
        let endpoint = self.endpoint_mut(role);
        let candidate = endpoint
            .candidates
            .iter()
            .find(|c| c.id == candidate_id)
            .cloned()
            .ok_or_else(|| {
                MapError::InvalidSelection(format!("no {role} candidate with id '{candidate_id}'"))
            })?;

        endpoint.latest_seq += 1;
        endpoint.query = candidate.label;
        Ok(self.resolve(role, candidate.location))
    }

    /// Resolve `role` directly (current location, quick location)
    pub fn resolve_endpoint(
        &mut self,
        role: EndpointRole,
        location: GeoPoint,
        label: impl Into<String>,
    ) -> Option<RouteTicket> {
        let endpoint = self.endpoint_mut(role);
        endpoint.latest_seq += 1;
        endpoint.query = label.into();
        self.resolve(role, location)
    }

    /// Record a device location request for `role`
    ///
    /// Supersedes in-flight searches for the role, and is itself superseded
    /// by any later search or selection.
    pub fn begin_locate(&mut self, role: EndpointRole) -> LocateTicket {
        let endpoint = self.endpoint_mut(role);
        endpoint.latest_seq += 1;
        LocateTicket {
            role,
            seq: endpoint.latest_seq,
        }
    }

    /// Apply a device location result for `ticket`
    ///
    /// A fix resolves the role and recentres the viewport on it.
    pub fn apply_location(
        &mut self,
        ticket: &LocateTicket,
        result: Result<GeoPoint, MapError>,
    ) -> LocationApplied {
        let role = ticket.role;
        let endpoint = self.endpoint_mut(role);
        if endpoint.latest_seq != ticket.seq {
            debug!(
                %role,
                seq = ticket.seq,
                latest = endpoint.latest_seq,
                "Discarding stale location fix"
            );
            return LocationApplied::Stale;
        }

        match result {
            Ok(point) => {
                endpoint.query = CURRENT_LOCATION_LABEL.to_string();
                self.viewport =
                    BoundingBox::around(point, REGION_LATITUDE_DELTA, REGION_LONGITUDE_DELTA);
                self.push_notice(Notice::info(
                    NoticeSource::Location,
                    "Success",
                    format!("{} location set to current position", role.display_name()),
                ));
                LocationApplied::Resolved(self.resolve(role, point))
            },
            Err(err) => {
                // a search this request superseded will never land
                if endpoint.phase == EndpointPhase::Searching {
                    endpoint.phase = EndpointPhase::Empty;
                }
                let (title, message) = match err {
                    MapError::LocationPermission => (
                        "Permission Denied",
                        "Location permission is needed to use current location",
                    ),
                    _ => ("Error", "Unable to get current location"),
                };
                warn!(%role, error = %err, "Current location unavailable");
                self.push_notice(Notice::warning(NoticeSource::Location, title, message));
                LocationApplied::Failed(err)
            },
        }
    }

    /// Clear one role back to `Empty`
    pub fn clear_endpoint(&mut self, role: EndpointRole) {
        let endpoint = self.endpoint_mut(role);
        let was_resolved = endpoint.resolved.is_some();
        endpoint.clear();
        if was_resolved {
            self.invalidate_route();
        }
    }

    /// Clear both roles and the route; overlays are kept
    pub fn reset(&mut self) {
        self.start.clear();
        self.end.clear();
        self.active_role = EndpointRole::Start;
        self.invalidate_route();
    }

    fn resolve(&mut self, role: EndpointRole, location: GeoPoint) -> Option<RouteTicket> {
        let endpoint = self.endpoint_mut(role);
        endpoint.resolved = Some(location);
        endpoint.candidates.clear();
        endpoint.phase = EndpointPhase::Resolved;
        self.invalidate_route();
        self.route_request()
    }

    // ------------------------------------------------------------------
    // Route
    // ------------------------------------------------------------------

    /// Current route
    #[must_use]
    pub const fn route(&self) -> Option<&RouteResult> {
        self.route.as_ref()
    }

    /// Whether a directions request is in flight
    #[must_use]
    pub const fn route_loading(&self) -> bool {
        self.route_loading
    }

    /// Re-request the route for the current pair (e.g. after a fallback)
    pub fn retry_route(&mut self) -> Option<RouteTicket> {
        self.invalidate_route();
        self.route_request()
    }

    fn invalidate_route(&mut self) {
        self.route_version += 1;
        self.route = None;
        self.route_loading = false;
    }

    fn route_request(&mut self) -> Option<RouteTicket> {
        let (Some(start), Some(end)) = (self.start.resolved, self.end.resolved) else {
            return None;
        };
        self.route_loading = true;
        Some(RouteTicket {
            version: self.route_version,
            start,
            end,
        })
    }

    /// Apply a directions response for `ticket`
    ///
    /// Failures and empty geometries fall back to the straight line between
    /// the ticket's endpoints and raise one notice. An answer without a route
    /// and a failed request are worded differently.
    pub fn apply_route(
        &mut self,
        ticket: &RouteTicket,
        result: Result<RouteResult, MapError>,
    ) -> RouteApplied {
        if ticket.version != self.route_version {
            debug!(
                version = ticket.version,
                latest = self.route_version,
                "Discarding stale directions response"
            );
            return RouteApplied::Stale;
        }
        self.route_loading = false;

        let (failure, notice) = match result {
            Ok(route) if !route.polyline.is_empty() => {
                self.route = Some(route);
                return RouteApplied::Routed;
            },
            Ok(_) => (
                "directions service returned no route geometry".to_string(),
                Self::no_route_notice(),
            ),
            Err(err @ MapError::NoRoute(_)) => (err.to_string(), Self::no_route_notice()),
            Err(err) => (
                err.to_string(),
                Notice::warning(
                    NoticeSource::Route,
                    "Routing Fallback",
                    "Detailed routing unavailable. Showing direct line between points.",
                ),
            ),
        };

        warn!(reason = %failure, "Falling back to straight-line route");
        self.route = Some(RouteResult::straight_line(ticket.start, ticket.end));
        self.push_notice(notice);
        RouteApplied::Fallback
    }

    fn no_route_notice() -> Notice {
        Notice::warning(
            NoticeSource::Route,
            "Route Notice",
            "Using straight line route as detailed routing is unavailable",
        )
    }

    // ------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------

    /// State of one layer
    #[must_use]
    pub const fn overlay(&self, layer: OverlayKind) -> &OverlayState {
        &self.overlays[slot_index(layer)].state
    }

    /// Switch a layer on or off
    ///
    /// Turning a layer on returns the fetch to run; turning it off drops its
    /// points at once and orphans any in-flight fetch. Setting the current
    /// value is a no-op.
    pub fn set_overlay_enabled(
        &mut self,
        layer: OverlayKind,
        enabled: bool,
    ) -> Option<OverlayTicket> {
        let region = self.viewport;
        let slot = &mut self.overlays[slot_index(layer)];
        if slot.state.is_enabled() == enabled {
            return None;
        }

        slot.generation += 1;
        if enabled {
            slot.state = OverlayState::Loading;
            Some(OverlayTicket {
                layer,
                generation: slot.generation,
                region,
            })
        } else {
            slot.state = OverlayState::Disabled;
            None
        }
    }

    /// Flip a layer; returns the fetch to run when it was switched on
    pub fn toggle_overlay(&mut self, layer: OverlayKind) -> Option<OverlayTicket> {
        let enabled = self.overlay(layer).is_enabled();
        self.set_overlay_enabled(layer, !enabled)
    }

    /// Apply an overlay response for `ticket`
    pub fn apply_overlay(
        &mut self,
        ticket: &OverlayTicket,
        result: Result<Vec<OverlayPoint>, MapError>,
    ) -> OverlayApplied {
        let layer = ticket.layer;
        let slot = &mut self.overlays[slot_index(layer)];
        if slot.generation != ticket.generation || slot.state != OverlayState::Loading {
            debug!(
                %layer,
                generation = ticket.generation,
                latest = slot.generation,
                "Discarding stale overlay response"
            );
            return OverlayApplied::Stale;
        }

        match result {
            Ok(points) => {
                let count = points.len();
                debug!(%layer, count, "Overlay loaded");
                slot.state = OverlayState::Loaded(points);
                OverlayApplied::Loaded(count)
            },
            Err(err) => {
                warn!(%layer, error = %err, "Overlay fetch failed");
                slot.state = OverlayState::Failed(err.clone());
                self.push_notice(Notice::warning(
                    NoticeSource::Overlay(layer),
                    "Layer Unavailable",
                    format!("Unable to load the {} layer.", layer.display_name()),
                ));
                OverlayApplied::Failed(err)
            },
        }
    }

    // ------------------------------------------------------------------
    // Viewport and notices
    // ------------------------------------------------------------------

    /// Visible map region
    #[must_use]
    pub const fn viewport(&self) -> BoundingBox {
        self.viewport
    }

    /// Update the visible region; used by the next viewport-scoped fetch
    pub fn set_viewport(&mut self, viewport: BoundingBox) {
        self.viewport = viewport;
    }

    /// Raise a notice
    pub fn push_notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Pending notices, oldest first
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Drain all pending notices
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Dismiss one notice; returns whether it was pending
    pub fn dismiss_notice(&mut self, id: Uuid) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    /// Build the render snapshot
    #[must_use]
    pub fn view_model(&self) -> MapViewModel {
        let mut markers = Vec::new();
        for (role, kind) in [
            (EndpointRole::Start, MarkerKind::Start),
            (EndpointRole::End, MarkerKind::End),
        ] {
            if let Some(location) = self.endpoint(role).resolved {
                markers.push(MapMarker {
                    location,
                    title: role.display_name().to_string(),
                    description: Some(self.endpoint(role).query.clone()).filter(|q| !q.is_empty()),
                    kind,
                });
            }
        }

        let overlays = OverlayKind::ALL
            .iter()
            .map(|&layer| {
                let state = self.overlay(layer);
                OverlayLayerView {
                    layer,
                    enabled: state.is_enabled(),
                    loading: matches!(state, OverlayState::Loading),
                    points: state.points().to_vec(),
                    last_error: state.last_error().map(ToString::to_string),
                }
            })
            .collect::<Vec<_>>();

        for view in &overlays {
            markers.extend(view.points.iter().map(|point| MapMarker {
                location: point.location,
                title: point.label.clone(),
                description: point.note.clone(),
                kind: MarkerKind::Overlay(view.layer),
            }));
        }

        MapViewModel {
            active_role: self.active_role,
            start: self.start.clone(),
            end: self.end.clone(),
            markers,
            route: self.route.clone(),
            route_loading: self.route_loading,
            overlays,
            viewport: self.viewport,
            notices: self.notices.clone(),
        }
    }
}
