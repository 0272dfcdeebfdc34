//! Tracing subscriber initialization and configuration

use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Configuration for logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level filter (e.g., "info", "application=debug,integration_mapbox=trace")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit one JSON object per event instead of human-readable lines
    #[serde(default)]
    pub json_output: bool,
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json_output: false,
        }
    }
}

impl TelemetryConfig {
    /// Same configuration with a different filter
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Build the event filter; `RUST_LOG` wins over the configured filter
    fn env_filter(&self) -> Result<EnvFilter, TelemetryError> {
        match EnvFilter::try_from_default_env() {
            Ok(filter) => Ok(filter),
            Err(_) => EnvFilter::try_new(&self.log_filter)
                .map_err(|e| TelemetryError::Filter(format!("{}: {e}", self.log_filter))),
        }
    }
}

/// Initialize the global tracing subscriber
///
/// Log output goes to stderr so that command output on stdout stays
/// machine-readable.
///
/// # Errors
///
/// Returns an error if the filter does not parse or a global subscriber is
/// already installed.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = config.env_filter()?;

    if config.json_output {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_target(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    info!(
        filter = %config.log_filter,
        json = config.json_output,
        "Telemetry initialized"
    );
    Ok(())
}

/// Error type for telemetry initialization
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to initialize tracing subscriber
    #[error("Failed to initialize tracing: {0}")]
    Init(String),

    /// The log filter directive is malformed
    #[error("Invalid log filter: {0}")]
    Filter(String),
}
