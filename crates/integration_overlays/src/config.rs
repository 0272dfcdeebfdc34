//! Overlay feed configuration

use serde::{Deserialize, Serialize};

/// Configuration for the accessible-parking feature service (ArcGIS REST)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingFeedConfig {
    /// Feature layer `query` endpoint
    #[serde(default = "default_query_url")]
    pub query_url: String,

    /// SQL `where` clause sent with every query
    #[serde(default = "default_where_clause")]
    pub where_clause: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum number of records per query (`resultRecordCount`)
    #[serde(default = "default_max_records")]
    pub max_records: u32,
}

fn default_query_url() -> String {
    "https://services1.arcgis.com/cNVyNtjGVZybOQWZ/arcgis/rest/services/Mobility_parking/FeatureServer/0/query"
        .to_string()
}

fn default_where_clause() -> String {
    "1=1".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_max_records() -> u32 {
    1000
}

impl Default for ParkingFeedConfig {
    fn default() -> Self {
        Self {
            query_url: default_query_url(),
            where_clause: default_where_clause(),
            timeout_secs: default_timeout_secs(),
            max_records: default_max_records(),
        }
    }
}

impl ParkingFeedConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            max_records: 50,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.query_url.is_empty() {
            return Err("query_url must not be empty".to_string());
        }

        if self.where_clause.trim().is_empty() {
            return Err("where_clause must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.max_records == 0 {
            return Err("max_records must be greater than 0".to_string());
        }

        Ok(())
    }
}

/// Configuration for the Overpass API (lifts and stairs)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverpassConfig {
    /// Base URL of the Overpass instance
    #[serde(default = "default_overpass_url")]
    pub base_url: String,

    /// Request timeout in seconds; also sent as the query's server timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_overpass_url() -> String {
    "https://overpass-api.de".to_string()
}

impl Default for OverpassConfig {
    fn default() -> Self {
        Self {
            base_url: default_overpass_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OverpassConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Interpreter endpoint
    #[must_use]
    pub fn interpreter_url(&self) -> String {
        format!("{}/api/interpreter", self.base_url.trim_end_matches('/'))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        Ok(())
    }
}
