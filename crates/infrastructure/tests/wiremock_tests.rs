//! Integration tests for the infrastructure crate
//!
//! Wires the real adapters into a `RouteCoordinator` and drives it against
//! wiremock servers standing in for Mapbox, the parking feed and Overpass.

use std::sync::Arc;
use std::time::Duration;

use application::{
    CoordinatorConfig, MapError, NoticeLevel, RouteApplied, RouteCoordinator, SearchOutcome,
};
use domain::{BoundingBox, EndpointRole, GeoPoint, OverlayKind};
use infrastructure::{
    MapboxDirectionsAdapter, MapboxGeocodingAdapter, OverlayFeedAdapter, StaticLocationProvider,
};
use integration_mapbox::MapboxConfig;
use integration_overlays::{OverpassConfig, ParkingFeedConfig};
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const OPERA: GeoPoint = GeoPoint::new_unchecked(-33.8568, 151.2153);
const CENTRAL: GeoPoint = GeoPoint::new_unchecked(-33.8839, 151.2065);

fn coordinator(server: &MockServer, location: StaticLocationProvider) -> RouteCoordinator {
    let mapbox = MapboxConfig {
        base_url: server.uri(),
        ..MapboxConfig::for_testing()
    };
    let parking = ParkingFeedConfig {
        query_url: format!("{}/parking/query", server.uri()),
        ..ParkingFeedConfig::for_testing()
    };
    let overpass = OverpassConfig {
        base_url: server.uri(),
        ..OverpassConfig::for_testing()
    };

    RouteCoordinator::new(
        Arc::new(MapboxGeocodingAdapter::from_config(&mapbox).unwrap()),
        Arc::new(MapboxDirectionsAdapter::from_config(&mapbox).unwrap()),
        Arc::new(OverlayFeedAdapter::from_config(&parking, &overpass).unwrap()),
        CoordinatorConfig {
            request_timeout: Duration::from_secs(3),
            initial_viewport: BoundingBox::around(GeoPoint::sydney(), 0.0922, 0.0421),
        },
    )
    .with_location(Arc::new(location))
}

async fn mount_single_match(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/geocoding/v5/mapbox\.places/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"features": [{"id": "poi.1", "place_name": "Central Station, Sydney", "center": [151.2065, -33.8839]}]}"#,
        ))
        .mount(server)
        .await;
}

#[tokio::test]
async fn search_then_route_end_to_end() {
    let server = MockServer::start().await;
    mount_single_match(&server).await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/directions/v5/mapbox/driving/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"code": "Ok", "routes": [{
                "geometry": {"coordinates": [[151.2153, -33.8568], [151.2065, -33.8839]]},
                "distance": 3412.7, "duration": 612.4
            }]}"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, StaticLocationProvider::new(OPERA));
    coordinator.use_current_location(Some(EndpointRole::Start)).await.unwrap();
    let outcome = coordinator.search(EndpointRole::End, "Central Station").await;

    assert_eq!(outcome, SearchOutcome::Resolved);
    let view = coordinator.snapshot();
    assert_eq!(view.end.resolved(), Some(CENTRAL));
    let route = view.route.unwrap();
    assert!(!route.degraded);
    assert_eq!(route.distance_meters, Some(3412.7));
}

#[tokio::test]
async fn directions_outage_falls_back_to_straight_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/directions/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, StaticLocationProvider::denied());
    coordinator
        .use_quick_location(Some(EndpointRole::Start), "Sydney Opera House")
        .await
        .unwrap();
    let applied = coordinator
        .use_quick_location(Some(EndpointRole::End), "Central Station")
        .await
        .unwrap();

    assert_eq!(applied, Some(RouteApplied::Fallback));
    let view = coordinator.snapshot();
    let route = view.route.unwrap();
    assert!(route.degraded);
    assert_eq!(route.polyline, vec![OPERA, CENTRAL]);
    assert!(
        view.notices
            .iter()
            .any(|n| n.level == NoticeLevel::Warning && n.title == "Routing Fallback")
    );
}

#[tokio::test]
async fn denied_location_leaves_role_empty() {
    let server = MockServer::start().await;
    let coordinator = coordinator(&server, StaticLocationProvider::denied());

    let err = coordinator.use_current_location(None).await.unwrap_err();

    assert_eq!(err, MapError::LocationPermission);
    assert!(coordinator.snapshot().start.resolved().is_none());
    assert_eq!(coordinator.take_notices()[0].title, "Permission Denied");
}

#[tokio::test]
async fn overlay_layers_fail_independently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/parking/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"features": [{"attributes": {"Address": "Phillip St"}, "geometry": {"x": 151.2122, "y": -33.8655}}]}"#,
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/interpreter"))
        .respond_with(ResponseTemplate::new(504))
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, StaticLocationProvider::denied());
    coordinator
        .set_overlays(&[OverlayKind::Parking, OverlayKind::Lift], true)
        .await;

    let view = coordinator.snapshot();
    let parking = view.overlay(OverlayKind::Parking).unwrap();
    assert_eq!(parking.points.len(), 1);
    assert!(parking.last_error.is_none());

    let lifts = view.overlay(OverlayKind::Lift).unwrap();
    assert!(lifts.enabled);
    assert!(lifts.points.is_empty());
    assert!(lifts.last_error.is_some());

    assert_eq!(
        view.markers
            .iter()
            .filter(|m| m.kind == application::MarkerKind::Overlay(OverlayKind::Parking))
            .count(),
        1
    );
}
