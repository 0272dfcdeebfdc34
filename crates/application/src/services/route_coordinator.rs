//! Route coordinator
//!
//! Drives the map screen: forwards user actions to [`MapState`], runs the
//! resulting geocoding, directions and overlay requests against the ports and
//! applies their results. The state lock is only ever held for the
//! synchronous begin/apply steps, never across a port call.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use domain::{BoundingBox, EndpointRole, GeoPoint, OverlayKind, QuickLocation};
use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::map_state::{
    LocationApplied, MapState, OverlayApplied, OverlayTicket, REGION_LATITUDE_DELTA,
    REGION_LONGITUDE_DELTA, RouteApplied, RouteTicket, SearchApplied,
};
use super::map_view::MapViewModel;
use super::notice::Notice;
use crate::error::MapError;
use crate::ports::{
    DirectionsPort, GeocodingPort, LocationAccuracy, LocationPort, OverlayFeedPort,
    PermissionStatus,
};

/// Coordinator settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinatorConfig {
    /// Upper bound for any single external call
    pub request_timeout: Duration,
    /// Region shown before the user pans
    pub initial_viewport: BoundingBox,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            initial_viewport: BoundingBox::around(
                GeoPoint::sydney(),
                REGION_LATITUDE_DELTA,
                REGION_LONGITUDE_DELTA,
            ),
        }
    }
}

/// What a search action ended in
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Query too short; candidates cleared, nothing sent
    Cleared,
    /// Superseded by a newer search for the same role
    Stale,
    /// Candidates are waiting for a pick
    Candidates(usize),
    /// Single match; the role resolved (and the route ran if both are set)
    Resolved,
    /// The search failed; a notice was raised
    Failed(MapError),
}

/// Orchestrates the map screen against its external services
pub struct RouteCoordinator {
    state: Mutex<MapState>,
    geocoder: Arc<dyn GeocodingPort>,
    directions: Arc<dyn DirectionsPort>,
    overlays: Arc<dyn OverlayFeedPort>,
    location: Option<Arc<dyn LocationPort>>,
    config: CoordinatorConfig,
}

impl fmt::Debug for RouteCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteCoordinator")
            .field("config", &self.config)
            .field("has_location", &self.location.is_some())
            .finish_non_exhaustive()
    }
}

impl RouteCoordinator {
    /// Create a coordinator with fresh state
    pub fn new(
        geocoder: Arc<dyn GeocodingPort>,
        directions: Arc<dyn DirectionsPort>,
        overlays: Arc<dyn OverlayFeedPort>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            state: Mutex::new(MapState::new(config.initial_viewport)),
            geocoder,
            directions,
            overlays,
            location: None,
            config,
        }
    }

    /// Attach a device location provider
    #[must_use]
    pub fn with_location(mut self, location: Arc<dyn LocationPort>) -> Self {
        self.location = Some(location);
        self
    }

    /// Render snapshot of the current state
    pub fn snapshot(&self) -> MapViewModel {
        self.state.lock().view_model()
    }

    // ------------------------------------------------------------------
    // Endpoint selection
    // ------------------------------------------------------------------

    /// Search for `text` on behalf of `role`
    ///
    /// A single match resolves the role at once and, when the other role is
    /// resolved too, computes the route before returning.
    #[instrument(skip(self))]
    pub async fn search(&self, role: EndpointRole, text: &str) -> SearchOutcome {
        let ticket = self.state.lock().begin_search(role, text);
        let Some(ticket) = ticket else {
            debug!("Query too short, not searching");
            return SearchOutcome::Cleared;
        };

        let result = self
            .bounded("geocoding", self.geocoder.search(&ticket.query), MapError::Geocode)
            .await;
        let applied = self.state.lock().apply_search(&ticket, result);

        match applied {
            SearchApplied::Stale => SearchOutcome::Stale,
            SearchApplied::Candidates(count) => SearchOutcome::Candidates(count),
            SearchApplied::Failed(err) => SearchOutcome::Failed(err),
            SearchApplied::Resolved(route) => {
                if let Some(route) = route {
                    self.run_route(route).await;
                }
                SearchOutcome::Resolved
            },
        }
    }

    /// Resolve `role` to one of its shown candidates
    ///
    /// # Errors
    ///
    /// Returns `MapError::InvalidSelection` for an unknown candidate id.
    #[instrument(skip(self))]
    pub async fn select_candidate(
        &self,
        role: EndpointRole,
        candidate_id: &str,
    ) -> Result<Option<RouteApplied>, MapError> {
        let route = self.state.lock().select_candidate(role, candidate_id)?;
        Ok(self.maybe_route(route).await)
    }

    /// Resolve a role from the device location
    ///
    /// Uses the active role when `role` is `None`. A fix also recentres the
    /// viewport on it. A denied permission or a failed fix leaves the role
    /// untouched and raises a notice. A search or selection for the same role
    /// issued while the fix is pending wins over it.
    ///
    /// # Errors
    ///
    /// Returns `MapError::LocationPermission` or
    /// `MapError::LocationUnavailable`.
    #[instrument(skip(self))]
    pub async fn use_current_location(
        &self,
        role: Option<EndpointRole>,
    ) -> Result<Option<RouteApplied>, MapError> {
        let ticket = {
            let mut state = self.state.lock();
            let role = role.unwrap_or_else(|| state.active_role());
            state.begin_locate(role)
        };
        let position = self.locate().await;

        let applied = self.state.lock().apply_location(&ticket, position);
        match applied {
            LocationApplied::Stale => Ok(None),
            LocationApplied::Failed(err) => Err(err),
            LocationApplied::Resolved(route) => {
                info!(role = %ticket.role, "Endpoint set from device location");
                Ok(self.maybe_route(route).await)
            },
        }
    }

    /// Resolve a role to one of the built-in quick locations
    ///
    /// # Errors
    ///
    /// Returns `MapError::InvalidSelection` when no preset has that name.
    #[instrument(skip(self))]
    pub async fn use_quick_location(
        &self,
        role: Option<EndpointRole>,
        name: &str,
    ) -> Result<Option<RouteApplied>, MapError> {
        let preset = QuickLocation::find(name)
            .ok_or_else(|| MapError::InvalidSelection(format!("unknown quick location '{name}'")))?;

        let route = {
            let mut state = self.state.lock();
            let role = role.unwrap_or_else(|| state.active_role());
            state.resolve_endpoint(role, preset.location, preset.name)
        };
        Ok(self.maybe_route(route).await)
    }

    /// Resolve a role to an explicit coordinate (a dropped pin)
    #[instrument(skip(self, label))]
    pub async fn set_endpoint(
        &self,
        role: EndpointRole,
        point: GeoPoint,
        label: &str,
    ) -> Option<RouteApplied> {
        let route = self.state.lock().resolve_endpoint(role, point, label);
        self.maybe_route(route).await
    }

    /// Clear one role back to empty; any route is dropped
    pub fn clear_endpoint(&self, role: EndpointRole) {
        self.state.lock().clear_endpoint(role);
    }

    /// Clear both roles and the route
    pub fn reset(&self) {
        self.state.lock().reset();
    }

    /// Role the search box edits
    pub fn active_role(&self) -> EndpointRole {
        self.state.lock().active_role()
    }

    /// Switch the edited role
    pub fn set_active_role(&self, role: EndpointRole) {
        self.state.lock().set_active_role(role);
    }

    /// Flip the edited role
    pub fn toggle_active_role(&self) -> EndpointRole {
        self.state.lock().toggle_active_role()
    }

    // ------------------------------------------------------------------
    // Route
    // ------------------------------------------------------------------

    /// Recompute the route for the current endpoint pair
    pub async fn refresh_route(&self) -> Option<RouteApplied> {
        let route = self.state.lock().retry_route();
        self.maybe_route(route).await
    }

    async fn maybe_route(&self, ticket: Option<RouteTicket>) -> Option<RouteApplied> {
        match ticket {
            Some(ticket) => Some(self.run_route(ticket).await),
            None => None,
        }
    }

    async fn run_route(&self, ticket: RouteTicket) -> RouteApplied {
        debug!(version = ticket.version, start = %ticket.start, end = %ticket.end, "Requesting route");
        let result = self
            .bounded(
                "directions",
                self.directions.route(ticket.start, ticket.end),
                MapError::Directions,
            )
            .await;
        self.state.lock().apply_route(&ticket, result)
    }

    // ------------------------------------------------------------------
    // Overlays
    // ------------------------------------------------------------------

    /// Switch a layer on or off; switching on fetches its points
    #[instrument(skip(self))]
    pub async fn set_overlay(&self, layer: OverlayKind, enabled: bool) -> Option<OverlayApplied> {
        let ticket = self.state.lock().set_overlay_enabled(layer, enabled);
        match ticket {
            Some(ticket) => Some(self.run_overlay(ticket).await),
            None => None,
        }
    }

    /// Flip a layer
    #[instrument(skip(self))]
    pub async fn toggle_overlay(&self, layer: OverlayKind) -> Option<OverlayApplied> {
        let ticket = self.state.lock().toggle_overlay(layer);
        match ticket {
            Some(ticket) => Some(self.run_overlay(ticket).await),
            None => None,
        }
    }

    /// Switch several layers at once; fetches run concurrently
    pub async fn set_overlays(
        &self,
        layers: &[OverlayKind],
        enabled: bool,
    ) -> Vec<(OverlayKind, Option<OverlayApplied>)> {
        join_all(
            layers
                .iter()
                .map(|&layer| async move { (layer, self.set_overlay(layer, enabled).await) }),
        )
        .await
    }

    async fn run_overlay(&self, ticket: OverlayTicket) -> OverlayApplied {
        let layer = ticket.layer;
        let result = self
            .bounded(
                "overlay",
                self.overlays.fetch(layer, &ticket.region),
                |message| MapError::overlay(layer, message),
            )
            .await;
        self.state.lock().apply_overlay(&ticket, result)
    }

    /// Update the visible region; enabled layers are not refetched
    pub fn set_viewport(&self, viewport: BoundingBox) {
        self.state.lock().set_viewport(viewport);
    }

    // ------------------------------------------------------------------
    // Notices
    // ------------------------------------------------------------------

    /// Drain pending notices
    pub fn take_notices(&self) -> Vec<Notice> {
        self.state.lock().take_notices()
    }

    /// Dismiss one notice by id
    pub fn dismiss_notice(&self, id: Uuid) -> bool {
        self.state.lock().dismiss_notice(id)
    }

    // ------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------

    async fn locate(&self) -> Result<GeoPoint, MapError> {
        let Some(location) = self.location.as_ref() else {
            return Err(MapError::LocationUnavailable(
                "no location provider configured".to_string(),
            ));
        };

        let permission = tokio::time::timeout(
            self.config.request_timeout,
            location.request_permission(),
        )
        .await
        .map_err(|_| MapError::LocationUnavailable("permission request timed out".to_string()))?;
        if permission == PermissionStatus::Denied {
            return Err(MapError::LocationPermission);
        }

        self.bounded(
            "location",
            location.current_position(LocationAccuracy::High),
            MapError::LocationUnavailable,
        )
        .await
    }

    /// Run `call` with the configured timeout; expiry becomes `on_timeout`
    async fn bounded<T, F>(
        &self,
        operation: &'static str,
        call: F,
        on_timeout: impl FnOnce(String) -> MapError,
    ) -> Result<T, MapError>
    where
        F: Future<Output = Result<T, MapError>>,
    {
        let limit = self.config.request_timeout;
        match tokio::time::timeout(limit, call).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_ms = limit.as_millis(), "External call timed out");
                Err(on_timeout(format!(
                    "{operation} request timed out after {}ms",
                    limit.as_millis()
                )))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use domain::{OverlayPoint, PlaceCandidate, RouteResult};

    use super::*;
    use crate::ports::{
        MockDirectionsPort, MockGeocodingPort, MockLocationPort, MockOverlayFeedPort,
    };
    use crate::services::map_state::{CURRENT_LOCATION_LABEL, EndpointPhase};

    const OPERA: GeoPoint = GeoPoint::new_unchecked(-33.8568, 151.2153);
    const CENTRAL: GeoPoint = GeoPoint::new_unchecked(-33.8839, 151.2065);

    fn coordinator(
        geocoder: MockGeocodingPort,
        directions: MockDirectionsPort,
        overlays: MockOverlayFeedPort,
    ) -> RouteCoordinator {
        RouteCoordinator::new(
            Arc::new(geocoder),
            Arc::new(directions),
            Arc::new(overlays),
            CoordinatorConfig::default(),
        )
    }

    fn idle() -> (MockGeocodingPort, MockDirectionsPort, MockOverlayFeedPort) {
        let mut geocoder = MockGeocodingPort::new();
        geocoder.expect_search().never();
        let mut directions = MockDirectionsPort::new();
        directions.expect_route().never();
        let mut overlays = MockOverlayFeedPort::new();
        overlays.expect_fetch().never();
        (geocoder, directions, overlays)
    }

    #[tokio::test]
    async fn single_match_auto_resolves() {
        let (_, directions, overlays) = idle();
        let mut geocoder = MockGeocodingPort::new();
        geocoder
            .expect_search()
            .withf(|q| q == "Sydney Opera House")
            .times(1)
            .returning(|_| Ok(vec![PlaceCandidate::new("poi.1", "Sydney Opera House", OPERA)]));

        let coordinator = coordinator(geocoder, directions, overlays);
        let outcome = coordinator.search(EndpointRole::Start, "Sydney Opera House").await;

        assert_eq!(outcome, SearchOutcome::Resolved);
        let view = coordinator.snapshot();
        assert_eq!(view.start.resolved(), Some(OPERA));
        assert_eq!(view.start.phase(), EndpointPhase::Resolved);
        assert!(view.route.is_none());
    }

    #[tokio::test]
    async fn dropped_pins_route_between_them() {
        let (geocoder, _, overlays) = idle();
        let mut directions = MockDirectionsPort::new();
        directions
            .expect_route()
            .withf(|start, end| *start == OPERA && *end == CENTRAL)
            .times(1)
            .returning(|start, end| Ok(RouteResult::routed(vec![start, end], 3400.0, 600.0)));

        let coordinator = coordinator(geocoder, directions, overlays);
        assert!(coordinator.set_endpoint(EndpointRole::Start, OPERA, "Pin A").await.is_none());
        let applied = coordinator.set_endpoint(EndpointRole::End, CENTRAL, "Pin B").await;

        assert_eq!(applied, Some(RouteApplied::Routed));
        let view = coordinator.snapshot();
        assert_eq!(view.end.query(), "Pin B");
        assert!(view.route.is_some_and(|route| !route.degraded));
    }

    #[tokio::test]
    async fn short_query_never_calls_geocoder() {
        let (geocoder, directions, overlays) = idle();
        let coordinator = coordinator(geocoder, directions, overlays);

        assert_eq!(coordinator.search(EndpointRole::End, "Sy").await, SearchOutcome::Cleared);
        assert!(coordinator.snapshot().end.candidates().is_empty());
    }

    #[tokio::test]
    async fn search_failure_raises_notice() {
        let (_, directions, overlays) = idle();
        let mut geocoder = MockGeocodingPort::new();
        geocoder
            .expect_search()
            .returning(|_| Err(MapError::Geocode("HTTP 503".to_string())));

        let coordinator = coordinator(geocoder, directions, overlays);
        let outcome = coordinator.search(EndpointRole::Start, "Opera").await;

        assert!(matches!(outcome, SearchOutcome::Failed(MapError::Geocode(_))));
        let notices = coordinator.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message, "Unable to search locations. Please try again.");
    }

    #[tokio::test]
    async fn directions_error_degrades_to_straight_line() {
        let (geocoder, _, overlays) = idle();
        let mut directions = MockDirectionsPort::new();
        directions
            .expect_route()
            .times(1)
            .returning(|_, _| Err(MapError::Directions("HTTP 500".to_string())));

        let coordinator = coordinator(geocoder, directions, overlays);
        coordinator
            .use_quick_location(Some(EndpointRole::Start), "Sydney Opera House")
            .await
            .unwrap();
        let applied = coordinator
            .use_quick_location(Some(EndpointRole::End), "central station")
            .await
            .unwrap();

        assert_eq!(applied, Some(RouteApplied::Fallback));
        let view = coordinator.snapshot();
        let route = view.route.unwrap();
        assert!(route.degraded);
        assert_eq!(route.polyline, vec![OPERA, CENTRAL]);
        assert_eq!(view.notices.len(), 1);
        assert_eq!(
            view.notices[0].message,
            "Detailed routing unavailable. Showing direct line between points."
        );
    }

    #[tokio::test]
    async fn routed_result_is_stored() {
        let (geocoder, _, overlays) = idle();
        let mut directions = MockDirectionsPort::new();
        directions
            .expect_route()
            .withf(|s, e| *s == OPERA && *e == CENTRAL)
            .returning(|s, e| Ok(RouteResult::routed(vec![s, e], 3200.0, 540.0)));

        let coordinator = coordinator(geocoder, directions, overlays);
        coordinator
            .use_quick_location(None, "Sydney Opera House")
            .await
            .unwrap();
        coordinator.set_active_role(EndpointRole::End);
        coordinator.use_quick_location(None, "Central Station").await.unwrap();

        let route = coordinator.snapshot().route.unwrap();
        assert!(!route.degraded);
        assert_eq!(route.distance_meters, Some(3200.0));
    }

    #[tokio::test]
    async fn clearing_an_endpoint_clears_route() {
        let (geocoder, _, overlays) = idle();
        let mut directions = MockDirectionsPort::new();
        directions
            .expect_route()
            .returning(|s, e| Ok(RouteResult::routed(vec![s, e], 100.0, 60.0)));

        let coordinator = coordinator(geocoder, directions, overlays);
        coordinator
            .use_quick_location(Some(EndpointRole::Start), "Circular Quay")
            .await
            .unwrap();
        coordinator
            .use_quick_location(Some(EndpointRole::End), "Darling Harbour")
            .await
            .unwrap();
        assert!(coordinator.snapshot().route.is_some());

        coordinator.clear_endpoint(EndpointRole::End);
        let view = coordinator.snapshot();
        assert!(view.route.is_none());
        assert!(!view.route_loading);
    }

    #[tokio::test]
    async fn unknown_quick_location_is_rejected() {
        let (geocoder, directions, overlays) = idle();
        let coordinator = coordinator(geocoder, directions, overlays);

        let result = coordinator.use_quick_location(None, "Bondi Beach").await;
        assert!(matches!(result, Err(MapError::InvalidSelection(_))));
    }

    #[tokio::test]
    async fn overlay_off_then_on_refetches() {
        let (geocoder, directions, _) = idle();
        let mut overlays = MockOverlayFeedPort::new();
        overlays
            .expect_fetch()
            .withf(|layer, _| *layer == OverlayKind::Lift)
            .times(2)
            .returning(|_, _| Ok(vec![OverlayPoint::new(CENTRAL, "Lift")]));

        let coordinator = coordinator(geocoder, directions, overlays);
        assert_eq!(
            coordinator.set_overlay(OverlayKind::Lift, true).await,
            Some(OverlayApplied::Loaded(1))
        );
        assert_eq!(coordinator.toggle_overlay(OverlayKind::Lift).await, None);
        assert!(coordinator.snapshot().overlay(OverlayKind::Lift).unwrap().points.is_empty());
        assert_eq!(
            coordinator.toggle_overlay(OverlayKind::Lift).await,
            Some(OverlayApplied::Loaded(1))
        );
    }

    #[tokio::test]
    async fn one_failing_layer_does_not_affect_others() {
        let (geocoder, directions, _) = idle();
        let mut overlays = MockOverlayFeedPort::new();
        overlays.expect_fetch().returning(|layer, _| match layer {
            OverlayKind::Parking => Err(MapError::overlay(layer, "HTTP 500")),
            _ => Ok(vec![OverlayPoint::new(OPERA, layer.default_label())]),
        });

        let coordinator = coordinator(geocoder, directions, overlays);
        let results = coordinator.set_overlays(&OverlayKind::ALL, true).await;
        assert_eq!(results.len(), 3);

        let view = coordinator.snapshot();
        let parking = view.overlay(OverlayKind::Parking).unwrap();
        assert!(parking.points.is_empty());
        assert!(parking.last_error.is_some());
        assert_eq!(view.overlay(OverlayKind::Lift).unwrap().points.len(), 1);
        assert_eq!(view.overlay(OverlayKind::Stairs).unwrap().points.len(), 1);
        assert_eq!(view.notices.len(), 1);
    }

    #[tokio::test]
    async fn viewport_change_does_not_refetch() {
        let (geocoder, directions, _) = idle();
        let mut overlays = MockOverlayFeedPort::new();
        overlays.expect_fetch().times(1).returning(|_, _| Ok(vec![]));

        let coordinator = coordinator(geocoder, directions, overlays);
        coordinator.set_overlay(OverlayKind::Stairs, true).await;
        coordinator.set_viewport(BoundingBox::around(CENTRAL, 0.01, 0.01));

        let view = coordinator.snapshot();
        assert_eq!(view.viewport, BoundingBox::around(CENTRAL, 0.01, 0.01));
        assert!(view.overlay(OverlayKind::Stairs).unwrap().enabled);
    }

    #[tokio::test]
    async fn denied_location_leaves_endpoint_unresolved() {
        let (geocoder, directions, overlays) = idle();
        let mut location = MockLocationPort::new();
        location
            .expect_request_permission()
            .returning(|| PermissionStatus::Denied);
        location.expect_current_position().never();

        let coordinator =
            coordinator(geocoder, directions, overlays).with_location(Arc::new(location));
        let result = coordinator.use_current_location(Some(EndpointRole::Start)).await;

        assert_eq!(result, Err(MapError::LocationPermission));
        let view = coordinator.snapshot();
        assert_eq!(view.start.resolved(), None);
        assert_eq!(
            view.notices[0].message,
            "Location permission is needed to use current location"
        );
    }

    #[tokio::test]
    async fn current_location_resolves_active_role() {
        let (geocoder, directions, overlays) = idle();
        let mut location = MockLocationPort::new();
        location
            .expect_request_permission()
            .returning(|| PermissionStatus::Granted);
        location
            .expect_current_position()
            .withf(|accuracy| *accuracy == LocationAccuracy::High)
            .returning(|_| Ok(CENTRAL));

        let coordinator =
            coordinator(geocoder, directions, overlays).with_location(Arc::new(location));
        coordinator.toggle_active_role();
        coordinator.use_current_location(None).await.unwrap();

        let view = coordinator.snapshot();
        assert_eq!(view.end.resolved(), Some(CENTRAL));
        assert_eq!(view.end.query(), CURRENT_LOCATION_LABEL);
        assert_eq!(
            view.viewport,
            BoundingBox::around(CENTRAL, REGION_LATITUDE_DELTA, REGION_LONGITUDE_DELTA)
        );
        assert_eq!(view.notices[0].message, "End location set to current position");
    }

    #[tokio::test]
    async fn location_failure_raises_notice() {
        let (geocoder, directions, overlays) = idle();
        let mut location = MockLocationPort::new();
        location
            .expect_request_permission()
            .returning(|| PermissionStatus::Granted);
        location
            .expect_current_position()
            .returning(|_| Err(MapError::LocationUnavailable("no fix".to_string())));

        let coordinator =
            coordinator(geocoder, directions, overlays).with_location(Arc::new(location));
        let result = coordinator.use_current_location(None).await;

        assert!(matches!(result, Err(MapError::LocationUnavailable(_))));
        assert_eq!(coordinator.take_notices()[0].message, "Unable to get current location");
    }

    struct SlowGeocoder;

    #[async_trait]
    impl GeocodingPort for SlowGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, MapError> {
            if query.starts_with("Circular") {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok(vec![
                    PlaceCandidate::new("a", "Circular Quay", OPERA),
                    PlaceCandidate::new("b", "Circular Quay Wharf", OPERA),
                ])
            } else {
                Ok(vec![PlaceCandidate::new("c", "Central Station", CENTRAL)])
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slower_older_search_is_discarded() {
        let (_, directions, overlays) = idle();
        let coordinator = RouteCoordinator::new(
            Arc::new(SlowGeocoder),
            Arc::new(directions),
            Arc::new(overlays),
            CoordinatorConfig::default(),
        );

        let (first, second) = tokio::join!(
            coordinator.search(EndpointRole::Start, "Circular Quay"),
            async {
                tokio::time::sleep(Duration::from_millis(10)).await;
                coordinator.search(EndpointRole::Start, "Central Station").await
            }
        );

        assert_eq!(second, SearchOutcome::Resolved);
        assert_eq!(first, SearchOutcome::Stale);
        let view = coordinator.snapshot();
        assert_eq!(view.start.resolved(), Some(CENTRAL));
        assert!(view.start.candidates().is_empty());
    }

    struct SlowFix;

    #[async_trait]
    impl LocationPort for SlowFix {
        async fn request_permission(&self) -> PermissionStatus {
            PermissionStatus::Granted
        }

        async fn current_position(
            &self,
            _accuracy: LocationAccuracy,
        ) -> Result<GeoPoint, MapError> {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok(GeoPoint::new_unchecked(-33.0, 151.0))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn late_location_fix_loses_to_newer_search() {
        let (_, directions, overlays) = idle();
        let coordinator = RouteCoordinator::new(
            Arc::new(SlowGeocoder),
            Arc::new(directions),
            Arc::new(overlays),
            CoordinatorConfig::default(),
        )
        .with_location(Arc::new(SlowFix));
        let initial_viewport = coordinator.snapshot().viewport;

        let (located, searched) = tokio::join!(
            coordinator.use_current_location(Some(EndpointRole::Start)),
            async {
                tokio::time::sleep(Duration::from_millis(50)).await;
                coordinator.search(EndpointRole::Start, "Central Station").await
            }
        );

        assert_eq!(searched, SearchOutcome::Resolved);
        assert_eq!(located, Ok(None));
        let view = coordinator.snapshot();
        assert_eq!(view.start.resolved(), Some(CENTRAL));
        assert_ne!(view.start.query(), CURRENT_LOCATION_LABEL);
        assert_eq!(view.viewport, initial_viewport);
        assert!(view.notices.is_empty());
    }

    struct HangingGeocoder;

    #[async_trait]
    impl GeocodingPort for HangingGeocoder {
        async fn search(&self, _query: &str) -> Result<Vec<PlaceCandidate>, MapError> {
            std::future::pending().await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn hung_call_times_out_as_failure() {
        let (_, directions, overlays) = idle();
        let coordinator = RouteCoordinator::new(
            Arc::new(HangingGeocoder),
            Arc::new(directions),
            Arc::new(overlays),
            CoordinatorConfig {
                request_timeout: Duration::from_secs(2),
                ..CoordinatorConfig::default()
            },
        );

        let outcome = coordinator.search(EndpointRole::Start, "Town Hall").await;
        match outcome {
            SearchOutcome::Failed(MapError::Geocode(message)) => {
                assert!(message.contains("timed out"));
            },
            other => panic!("expected timeout failure, got {other:?}"),
        }
        assert_eq!(coordinator.snapshot().start.phase(), EndpointPhase::Failed);
    }

    #[tokio::test]
    async fn reset_keeps_overlays() {
        let (geocoder, _, _) = idle();
        let mut directions = MockDirectionsPort::new();
        directions
            .expect_route()
            .returning(|s, e| Ok(RouteResult::routed(vec![s, e], 1.0, 1.0)));
        let mut overlays = MockOverlayFeedPort::new();
        overlays.expect_fetch().returning(|_, _| Ok(vec![]));

        let coordinator = coordinator(geocoder, directions, overlays);
        coordinator.set_overlay(OverlayKind::Parking, true).await;
        coordinator
            .use_quick_location(Some(EndpointRole::Start), "Circular Quay")
            .await
            .unwrap();
        coordinator
            .use_quick_location(Some(EndpointRole::End), "Central Station")
            .await
            .unwrap();

        coordinator.reset();
        let view = coordinator.snapshot();
        assert!(view.route.is_none());
        assert_eq!(view.start.resolved(), None);
        assert!(matches!(
            view.overlay(OverlayKind::Parking).map(|o| o.enabled),
            Some(true)
        ));
    }
}
