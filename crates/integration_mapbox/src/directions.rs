//! Mapbox directions client
//!
//! Computes a route between two points with the Mapbox Directions API
//! (`/directions/v5/mapbox/{profile}/{lon},{lat};{lon},{lat}`), requesting
//! the full `GeoJSON` overview geometry.

use std::time::Duration;

use async_trait::async_trait;
use domain::{GeoPoint, RouteResult};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;

use crate::config::MapboxConfig;
use crate::error::{DirectionsError, retry_after_secs};
use crate::models::DirectionsResponse;

/// Trait for directions clients
#[async_trait]
pub trait DirectionsClient: Send + Sync {
    /// Compute a route from `start` to `end`
    async fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<RouteResult, DirectionsError>;
}

/// Mapbox-based directions client
#[derive(Debug)]
pub struct MapboxDirectionsClient {
    client: Client,
    config: MapboxConfig,
}

impl MapboxDirectionsClient {
    /// Create a new Mapbox directions client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be initialized.
    pub fn new(config: &MapboxConfig) -> Result<Self, DirectionsError> {
        Url::parse(&config.base_url)
            .map_err(|e| DirectionsError::ConfigurationError(format!("base_url: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("AccessibleRouteApp/1.0")
            .build()
            .map_err(|e| DirectionsError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    /// Build the directions URL; coordinates go in `lon,lat` order
    fn route_url(&self, start: GeoPoint, end: GeoPoint) -> Result<Url, DirectionsError> {
        let coordinates = format!(
            "{},{};{},{}",
            start.longitude(),
            start.latitude(),
            end.longitude(),
            end.latitude()
        );

        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| DirectionsError::ConfigurationError(format!("base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                DirectionsError::ConfigurationError("base_url cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(["directions", "v5", "mapbox", self.config.profile.as_str()])
            .push(&coordinates);
        Ok(url)
    }

    /// Parse a raw directions response body into the first route
    fn parse_response(body: &str) -> Result<RouteResult, DirectionsError> {
        let raw: DirectionsResponse =
            serde_json::from_str(body).map_err(|e| DirectionsError::ParseError(e.to_string()))?;

        let Some(route) = raw.routes.into_iter().next() else {
            let reason = raw
                .message
                .or(raw.code)
                .unwrap_or_else(|| "response contained no routes".to_string());
            return Err(DirectionsError::NoRoute(reason));
        };

        let polyline = route
            .geometry
            .coordinates
            .iter()
            .map(|position| match position.as_slice() {
                [longitude, latitude, ..] => GeoPoint::from_lon_lat(*longitude, *latitude)
                    .map_err(|e| DirectionsError::ParseError(e.to_string())),
                _ => Err(DirectionsError::ParseError(format!(
                    "position needs two values, got {}",
                    position.len()
                ))),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RouteResult::routed(polyline, route.distance, route.duration))
    }
}

#[async_trait]
impl DirectionsClient for MapboxDirectionsClient {
    #[instrument(skip(self, start, end), fields(start = %start, end = %end))]
    async fn route(&self, start: GeoPoint, end: GeoPoint) -> Result<RouteResult, DirectionsError> {
        let url = self.route_url(start, end)?;
        let params = [
            ("access_token", self.config.access_token.as_str()),
            ("geometries", "geojson"),
            ("overview", "full"),
            ("alternatives", "false"),
            ("steps", "false"),
        ];

        debug!(path = url.path(), "Requesting directions");

        let response = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DirectionsError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    DirectionsError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(DirectionsError::RateLimitExceeded {
                retry_after_secs: retry_after_secs(response.headers()),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| DirectionsError::ParseError(e.to_string()))?;

        // Mapbox answers "no route" with 200 or 422 and a JSON code
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            if let Ok(DirectionsResponse {
                code: Some(code), ..
            }) = serde_json::from_str::<DirectionsResponse>(&body)
            {
                return Err(DirectionsError::NoRoute(code));
            }
        }

        if !status.is_success() {
            return Err(DirectionsError::RequestFailed(format!("HTTP {status}")));
        }

        let route = Self::parse_response(&body)?;
        debug!(
            points = route.polyline.len(),
            distance_m = ?route.distance_meters,
            duration_s = ?route.duration_seconds,
            "Route found"
        );
        Ok(route)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: GeoPoint = GeoPoint::new_unchecked(-33.8568, 151.2153);
    const END: GeoPoint = GeoPoint::new_unchecked(-33.8839, 151.2065);

    #[test]
    fn test_route_url_uses_lon_lat_order() {
        let client = MapboxDirectionsClient::new(&MapboxConfig::for_testing()).unwrap();
        let url = client.route_url(START, END).unwrap();
        assert_eq!(
            url.path(),
            "/directions/v5/mapbox/driving/151.2153,-33.8568;151.2065,-33.8839"
        );
    }

    #[test]
    fn test_route_url_uses_profile() {
        let config = MapboxConfig {
            profile: "walking".to_string(),
            ..MapboxConfig::for_testing()
        };
        let client = MapboxDirectionsClient::new(&config).unwrap();
        assert!(client.route_url(START, END).unwrap().path().contains("/mapbox/walking/"));
    }

    #[test]
    fn test_parse_converts_geometry() {
        let body = r#"{"code": "Ok", "routes": [{
            "geometry": {"coordinates": [[151.2153, -33.8568], [151.21, -33.87], [151.2065, -33.8839]]},
            "distance": 3210.5,
            "duration": 540.2
        }]}"#;
        let route = MapboxDirectionsClient::parse_response(body).unwrap();
        assert_eq!(route.polyline.len(), 3);
        assert_eq!(route.polyline[0], START);
        assert_eq!(route.polyline[2], END);
        assert_eq!(route.distance_meters, Some(3210.5));
        assert_eq!(route.duration_seconds, Some(540.2));
        assert!(!route.degraded);
    }

    #[test]
    fn test_parse_zero_routes_is_no_route() {
        let body = r#"{"code": "NoRoute", "message": "No route found", "routes": []}"#;
        match MapboxDirectionsClient::parse_response(body) {
            Err(DirectionsError::NoRoute(reason)) => assert_eq!(reason, "No route found"),
            other => panic!("expected NoRoute, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_out_of_range_positions() {
        let body = r#"{"routes": [{
            "geometry": {"coordinates": [[-33.8568, 151.2153]]},
            "distance": 1.0,
            "duration": 1.0
        }]}"#;
        assert!(matches!(
            MapboxDirectionsClient::parse_response(body),
            Err(DirectionsError::ParseError(_))
        ));
    }
}
