//! Application configuration
//!
//! Layered from defaults, an optional `config.toml` in the working directory
//! and `ACCESSROUTE_*` environment variables (nested keys use `__`, e.g.
//! `ACCESSROUTE_MAPBOX__ACCESS_TOKEN`).

use std::time::Duration;

use application::services::CoordinatorConfig;
use config::{Config, ConfigError, Environment, File, FileFormat};
use domain::{BoundingBox, DomainError, GeoPoint};
use integration_mapbox::MapboxConfig;
use integration_overlays::{OverpassConfig, ParkingFeedConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::telemetry::TelemetryConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "ACCESSROUTE";

/// Map screen settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapAppConfig {
    /// Upper bound for any single external call, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Region shown before the user pans
    #[serde(default)]
    pub initial_viewport: ViewportConfig,
}

const fn default_request_timeout_secs() -> u64 {
    10
}

impl Default for MapAppConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            initial_viewport: ViewportConfig::default(),
        }
    }
}

/// A map region given as centre plus span
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportConfig {
    /// Centre latitude
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,
    /// Centre longitude
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,
    /// North-south span in degrees
    #[serde(default = "default_latitude_delta")]
    pub latitude_delta: f64,
    /// East-west span in degrees
    #[serde(default = "default_longitude_delta")]
    pub longitude_delta: f64,
}

const fn default_center_latitude() -> f64 {
    -33.8688
}

const fn default_center_longitude() -> f64 {
    151.2093
}

const fn default_latitude_delta() -> f64 {
    0.0922
}

const fn default_longitude_delta() -> f64 {
    0.0421
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            center_latitude: default_center_latitude(),
            center_longitude: default_center_longitude(),
            latitude_delta: default_latitude_delta(),
            longitude_delta: default_longitude_delta(),
        }
    }
}

impl ViewportConfig {
    /// Convert to a bounding box
    ///
    /// # Errors
    ///
    /// Returns an error if the centre is not a valid coordinate.
    pub fn to_bounding_box(&self) -> Result<BoundingBox, DomainError> {
        let center = GeoPoint::new(self.center_latitude, self.center_longitude)?;
        Ok(BoundingBox::around(
            center,
            self.latitude_delta,
            self.longitude_delta,
        ))
    }
}

/// Fixed device location reported by the static location provider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Latitude of the fix
    pub latitude: f64,
    /// Longitude of the fix
    pub longitude: f64,
}

impl LocationConfig {
    /// Convert to a point
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinate is out of range.
    pub fn to_point(&self) -> Result<GeoPoint, DomainError> {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Mapbox geocoding and directions
    #[serde(default)]
    pub mapbox: MapboxConfig,

    /// Accessible parking feature service
    #[serde(default)]
    pub parking: ParkingFeedConfig,

    /// Overpass API (lifts, stairs)
    #[serde(default)]
    pub overpass: OverpassConfig,

    /// Map screen settings
    #[serde(default)]
    pub map: MapAppConfig,

    /// Device location; absent means location access is denied
    #[serde(default)]
    pub location: Option<LocationConfig>,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be read or a value has the wrong
    /// type.
    pub fn load() -> Result<Self, ConfigError> {
        Self::build(File::with_name("config").required(false), true)
    }

    /// Load configuration from an explicit file, still honouring the
    /// environment
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        Self::build(File::with_name(path).required(true), true)
    }

    /// Parse configuration from TOML text only
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this schema.
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::build(File::from_str(toml, FileFormat::Toml), false)
    }

    fn build<S>(file: S, with_env: bool) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let mut builder = Config::builder()
            .set_default("map.request_timeout_secs", default_request_timeout_secs())?
            .set_default("telemetry.log_filter", "warn")?
            .add_source(file);

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );
        }

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns the first problem found, prefixed with its section.
    pub fn validate(&self) -> Result<(), String> {
        self.mapbox.validate().map_err(|e| format!("mapbox: {e}"))?;
        self.parking.validate().map_err(|e| format!("parking: {e}"))?;
        self.overpass
            .validate()
            .map_err(|e| format!("overpass: {e}"))?;

        if self.map.request_timeout_secs == 0 {
            return Err("map: request_timeout_secs must be greater than 0".to_string());
        }

        let viewport = &self.map.initial_viewport;
        let positive = |delta: f64| delta.is_finite() && delta > 0.0;
        if !positive(viewport.latitude_delta) || !positive(viewport.longitude_delta) {
            return Err("map: initial_viewport deltas must be positive and finite".to_string());
        }
        viewport
            .to_bounding_box()
            .map_err(|e| format!("map: initial_viewport: {e}"))?;

        if let Some(location) = &self.location {
            location.to_point().map_err(|e| format!("location: {e}"))?;
        }

        Ok(())
    }

    /// Settings for the route coordinator
    ///
    /// # Errors
    ///
    /// Returns an error if the initial viewport is not a valid region.
    pub fn coordinator_config(&self) -> Result<CoordinatorConfig, DomainError> {
        Ok(CoordinatorConfig {
            request_timeout: Duration::from_secs(self.map.request_timeout_secs),
            initial_viewport: self.map.initial_viewport.to_bounding_box()?,
        })
    }

    /// The configured device fix, if any
    ///
    /// # Errors
    ///
    /// Returns an error if the configured coordinate is out of range.
    pub fn device_location(&self) -> Result<Option<GeoPoint>, DomainError> {
        self.location.as_ref().map(LocationConfig::to_point).transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_without_any_source() {
        let config = AppConfig::from_toml_str("").unwrap();

        assert_eq!(config.mapbox.base_url, "https://api.mapbox.com");
        assert_eq!(config.mapbox.country_filter, "au");
        assert_eq!(config.mapbox.result_limit, 5);
        assert_eq!(config.overpass.base_url, "https://overpass-api.de");
        assert_eq!(config.map.request_timeout_secs, 10);
        assert_eq!(config.map.initial_viewport, ViewportConfig::default());
        assert!(config.location.is_none());
        assert_eq!(config.telemetry.log_filter, "warn");
    }

    #[test]
    fn toml_overrides_nested_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [mapbox]
            access_token = "pk.abc"
            profile = "walking"

            [map]
            request_timeout_secs = 4

            [map.initial_viewport]
            center_latitude = -33.8568
            center_longitude = 151.2153

            [location]
            latitude = -33.8599
            longitude = 151.2111

            [telemetry]
            json_output = true
            "#,
        )
        .unwrap();

        assert_eq!(config.mapbox.access_token, "pk.abc");
        assert_eq!(config.mapbox.profile, "walking");
        assert_eq!(config.mapbox.result_limit, 5);
        assert_eq!(config.map.request_timeout_secs, 4);
        assert!((config.map.initial_viewport.latitude_delta - 0.0922).abs() < f64::EPSILON);
        assert!(config.telemetry.json_output);
        assert_eq!(
            config.device_location().unwrap(),
            Some(GeoPoint::new_unchecked(-33.8599, 151.2111))
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn wrong_type_is_rejected() {
        let result = AppConfig::from_toml_str("[map]\nrequest_timeout_secs = \"soon\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[overpass]\nbase_url = \"http://localhost:12345\"").unwrap();

        let path = file.path().to_str().unwrap();
        let config = AppConfig::load_from(path).unwrap();
        assert_eq!(config.overpass.base_url, "http://localhost:12345");
    }

    #[test]
    fn load_from_missing_file_fails() {
        assert!(AppConfig::load_from("/nonexistent/accessroute-config.toml").is_err());
    }

    #[test]
    fn validate_requires_token() {
        let config = AppConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("mapbox:"));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = AppConfig {
            mapbox: MapboxConfig::for_testing(),
            ..AppConfig::default()
        };
        config.map.request_timeout_secs = 0;
        assert!(config.validate().unwrap_err().contains("request_timeout_secs"));
    }

    #[test]
    fn validate_rejects_nan_viewport_delta() {
        let mut config = AppConfig {
            mapbox: MapboxConfig::for_testing(),
            ..AppConfig::default()
        };
        config.map.initial_viewport.latitude_delta = f64::NAN;
        assert!(config.validate().unwrap_err().contains("initial_viewport deltas"));

        config.map.initial_viewport.latitude_delta = 0.0922;
        config.map.initial_viewport.longitude_delta = f64::INFINITY;
        assert!(config.validate().unwrap_err().contains("initial_viewport deltas"));
    }

    #[test]
    fn validate_rejects_bad_location() {
        let config = AppConfig {
            mapbox: MapboxConfig::for_testing(),
            location: Some(LocationConfig {
                latitude: 151.2,
                longitude: -33.8,
            }),
            ..AppConfig::default()
        };
        assert!(config.validate().unwrap_err().starts_with("location:"));
    }

    #[test]
    fn coordinator_config_uses_map_section() {
        let mut config = AppConfig::default();
        config.map.request_timeout_secs = 3;

        let coordinator = config.coordinator_config().unwrap();
        assert_eq!(coordinator.request_timeout, Duration::from_secs(3));
        assert!(coordinator.initial_viewport.contains(&GeoPoint::sydney()));
    }
}
