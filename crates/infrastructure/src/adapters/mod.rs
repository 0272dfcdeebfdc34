//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod mapbox_adapter;
mod overlay_feed_adapter;
mod static_location;

pub use mapbox_adapter::{MapboxDirectionsAdapter, MapboxGeocodingAdapter};
pub use overlay_feed_adapter::OverlayFeedAdapter;
pub use static_location::StaticLocationProvider;
