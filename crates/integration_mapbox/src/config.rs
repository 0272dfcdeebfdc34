//! Mapbox client configuration

use serde::{Deserialize, Serialize};

/// Configuration shared by the Mapbox geocoding and directions clients
#[derive(Clone, Serialize, Deserialize)]
pub struct MapboxConfig {
    /// Public access token sent as `access_token`
    #[serde(default)]
    pub access_token: String,

    /// Base URL for the Mapbox API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// ISO 3166 country code(s) that bias geocoding results (comma separated)
    #[serde(default = "default_country_filter")]
    pub country_filter: String,

    /// Maximum number of geocoding candidates
    #[serde(default = "default_result_limit")]
    pub result_limit: u8,

    /// Directions routing profile (driving, walking, cycling, driving-traffic)
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Geocoding cache TTL in minutes (0 to disable caching)
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: u32,
}

impl std::fmt::Debug for MapboxConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxConfig")
            .field("access_token", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("country_filter", &self.country_filter)
            .field("result_limit", &self.result_limit)
            .field("profile", &self.profile)
            .field("cache_ttl_minutes", &self.cache_ttl_minutes)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api.mapbox.com".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

fn default_country_filter() -> String {
    "au".to_string()
}

const fn default_result_limit() -> u8 {
    5
}

fn default_profile() -> String {
    "driving".to_string()
}

const fn default_cache_ttl_minutes() -> u32 {
    60
}

impl Default for MapboxConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            country_filter: default_country_filter(),
            result_limit: default_result_limit(),
            profile: default_profile(),
            cache_ttl_minutes: default_cache_ttl_minutes(),
        }
    }
}

const PROFILES: [&str; 4] = ["driving", "driving-traffic", "walking", "cycling"];

impl MapboxConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            access_token: "pk.test-token".to_string(),
            timeout_secs: 5,
            cache_ttl_minutes: 0,
            ..Default::default()
        }
    }

    /// Check if geocoding caching is enabled
    #[must_use]
    pub const fn caching_enabled(&self) -> bool {
        self.cache_ttl_minutes > 0
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.access_token.trim().is_empty() {
            return Err("access_token must not be empty".to_string());
        }

        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }

        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.result_limit == 0 || self.result_limit > 10 {
            return Err("result_limit must be between 1 and 10".to_string());
        }

        if !PROFILES.contains(&self.profile.as_str()) {
            return Err(format!(
                "profile must be one of {}, got '{}'",
                PROFILES.join(", "),
                self.profile
            ));
        }

        Ok(())
    }
}
