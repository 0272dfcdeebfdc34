//! Mapbox integration for AccessRoute
//!
//! Provides free-text place search via the Mapbox Geocoding API
//! (`mapbox.places`, v5) and point-to-point routing via the Mapbox
//! Directions API (v5).
//!
//! # Architecture
//!
//! [`GeocodingClient`] and [`DirectionsClient`] define the client interfaces,
//! implemented by [`MapboxGeocodingClient`] and [`MapboxDirectionsClient`].
//! Both normalize Mapbox's `[longitude, latitude]` coordinate order into
//! domain [`GeoPoint`](domain::GeoPoint)s.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_mapbox::{GeocodingClient, MapboxConfig, MapboxGeocodingClient};
//!
//! let config = MapboxConfig {
//!     access_token: "pk.test".to_string(),
//!     ..MapboxConfig::default()
//! };
//! let client = MapboxGeocodingClient::new(&config)?;
//! let places = client.search("Sydney Opera House").await?;
//! ```

mod config;
mod directions;
mod error;
mod geocoding;
mod models;

pub use config::MapboxConfig;
pub use directions::{DirectionsClient, MapboxDirectionsClient};
pub use error::{DirectionsError, GeocodingError};
pub use geocoding::{GeocodingClient, MIN_QUERY_CHARS, MapboxGeocodingClient};
