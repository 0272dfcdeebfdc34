//! Accessibility overlay feeds for AccessRoute
//!
//! Fetches the three map overlay layers and normalizes each backend's
//! geometry into domain [`OverlayPoint`](domain::OverlayPoint)s:
//!
//! - accessible parking from an ArcGIS feature service query
//!   ([`ArcGisParkingClient`]), a fixed region independent of the viewport
//! - lifts and stairs from the [Overpass API](https://overpass-api.de)
//!   ([`OverpassClient`]), scoped to a bounding box
//!
//! Records without usable coordinates are dropped silently.

mod config;
mod error;
mod models;
mod overpass;
mod parking;

pub use config::{OverpassConfig, ParkingFeedConfig};
pub use error::OverlayError;
pub use overpass::{OsmFeatureClient, OverpassClient};
pub use parking::{ArcGisParkingClient, ParkingFeedClient};
