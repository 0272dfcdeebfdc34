//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports on top of the Mapbox and overlay feed
//! clients, and provides configuration loading and logging setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, LocationConfig, MapAppConfig, ViewportConfig};
pub use telemetry::{TelemetryConfig, TelemetryError, init_telemetry};
