//! Route result attached to a resolved start/end pair

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::GeoPoint;

/// A computed route between the resolved endpoints
///
/// `degraded` routes are the two-point straight line used when the
/// directions service fails or finds nothing; they carry no distance or
/// duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    /// Ordered route geometry in (lat, lon) points
    pub polyline: Vec<GeoPoint>,
    /// Total distance in meters (None when degraded)
    pub distance_meters: Option<f64>,
    /// Total duration in seconds (None when degraded)
    pub duration_seconds: Option<f64>,
    /// Whether this is the straight-line fallback
    pub degraded: bool,
}

impl RouteResult {
    /// A route as returned by the directions service
    #[must_use]
    pub fn routed(polyline: Vec<GeoPoint>, distance_meters: f64, duration_seconds: f64) -> Self {
        Self {
            polyline,
            distance_meters: Some(distance_meters),
            duration_seconds: Some(duration_seconds),
            degraded: false,
        }
    }

    /// The straight-line fallback between two endpoints
    #[must_use]
    pub fn straight_line(start: GeoPoint, end: GeoPoint) -> Self {
        Self {
            polyline: vec![start, end],
            distance_meters: None,
            duration_seconds: None,
            degraded: true,
        }
    }

    /// First polyline point
    #[must_use]
    pub fn start(&self) -> Option<&GeoPoint> {
        self.polyline.first()
    }

    /// Last polyline point
    #[must_use]
    pub fn end(&self) -> Option<&GeoPoint> {
        self.polyline.last()
    }

    /// Compact one-line summary
    #[must_use]
    pub fn format_summary(&self) -> String {
        if self.degraded {
            let direct = match (self.start(), self.end()) {
                (Some(a), Some(b)) => format!(" (~{:.1} km direct)", a.distance_km(b)),
                _ => String::new(),
            };
            return format!("Direct line only{direct}");
        }

        let km = self.distance_meters.unwrap_or_default() / 1000.0;
        let minutes = (self.duration_seconds.unwrap_or_default() / 60.0).round();
        format!(
            "{km:.1} km, {minutes:.0} min ({} points)",
            self.polyline.len()
        )
    }
}

impl fmt::Display for RouteResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_summary())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_line_is_degraded_pair() {
        let start = GeoPoint::new_unchecked(-33.86, 151.20);
        let end = GeoPoint::new_unchecked(-33.85, 151.21);
        let route = RouteResult::straight_line(start, end);

        assert!(route.degraded);
        assert_eq!(route.polyline, vec![start, end]);
        assert!(route.distance_meters.is_none());
        assert!(route.duration_seconds.is_none());
        assert!(route.format_summary().starts_with("Direct line only"));
    }

    #[test]
    fn routed_summary() {
        let route = RouteResult::routed(
            vec![GeoPoint::new_unchecked(-33.86, 151.20), GeoPoint::new_unchecked(-33.85, 151.21)],
            2460.0,
            420.0,
        );
        assert!(!route.degraded);
        assert_eq!(route.format_summary(), "2.5 km, 7 min (2 points)");
    }
}
