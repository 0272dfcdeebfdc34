//! Port definitions for application layer
//!
//! Ports are interfaces that define how the map screen interacts with
//! external services. Adapters in the infrastructure layer implement these ports.

mod directions_port;
mod geocoding_port;
mod location_port;
mod overlay_feed_port;

pub use directions_port::DirectionsPort;
#[cfg(test)]
pub use directions_port::MockDirectionsPort;
pub use geocoding_port::GeocodingPort;
#[cfg(test)]
pub use geocoding_port::MockGeocodingPort;
pub use location_port::{LocationAccuracy, LocationPort, PermissionStatus};
#[cfg(test)]
pub use location_port::MockLocationPort;
#[cfg(test)]
pub use overlay_feed_port::MockOverlayFeedPort;
pub use overlay_feed_port::OverlayFeedPort;
