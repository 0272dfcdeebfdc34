//! Mapbox geocoding client
//!
//! Resolves free text to candidate places using the Mapbox Geocoding API
//! (`/geocoding/v5/mapbox.places/{query}.json`). Results are biased to the
//! configured country and cached per normalized query.

use std::time::Duration;

use async_trait::async_trait;
use domain::{GeoPoint, PlaceCandidate};
use moka::future::Cache;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::MapboxConfig;
use crate::error::{GeocodingError, retry_after_secs};
use crate::models::{GeocodingFeature, GeocodingResponse};

/// Queries shorter than this (after trimming) resolve to no candidates
pub const MIN_QUERY_CHARS: usize = 3;

/// Trait for geocoding clients
#[async_trait]
pub trait GeocodingClient: Send + Sync {
    /// Search for places matching free text
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, GeocodingError>;
}

/// Mapbox-based geocoding client with result caching
#[derive(Debug)]
pub struct MapboxGeocodingClient {
    client: Client,
    config: MapboxConfig,
    cache: Option<Cache<String, Vec<PlaceCandidate>>>,
}

impl MapboxGeocodingClient {
    /// Create a new Mapbox geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the HTTP client cannot
    /// be initialized.
    pub fn new(config: &MapboxConfig) -> Result<Self, GeocodingError> {
        Url::parse(&config.base_url)
            .map_err(|e| GeocodingError::ConfigurationError(format!("base_url: {e}")))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("AccessibleRouteApp/1.0")
            .build()
            .map_err(|e| GeocodingError::ConnectionFailed(e.to_string()))?;

        let cache = config.caching_enabled().then(|| {
            Cache::builder()
                .max_capacity(500)
                .time_to_live(Duration::from_secs(u64::from(config.cache_ttl_minutes) * 60))
                .build()
        });

        Ok(Self {
            client,
            config: config.clone(),
            cache,
        })
    }

    /// Build the search URL with the query as an encoded path segment
    fn search_url(&self, query: &str) -> Result<Url, GeocodingError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| GeocodingError::ConfigurationError(format!("base_url: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                GeocodingError::ConfigurationError("base_url cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places"])
            .push(&format!("{query}.json"));
        Ok(url)
    }

    /// Normalize a feature into a candidate; features without a usable
    /// centre are skipped
    fn convert_feature(feature: GeocodingFeature) -> Option<PlaceCandidate> {
        let center = feature.center?;
        let [longitude, latitude] = center.as_slice() else {
            return None;
        };
        let location = GeoPoint::from_lon_lat(*longitude, *latitude).ok()?;
        let label = feature.place_name.or(feature.text)?;
        Some(PlaceCandidate::new(feature.id, label, location))
    }

    /// Parse a raw geocoding response body
    fn parse_response(body: &str) -> Result<Vec<PlaceCandidate>, GeocodingError> {
        let raw: GeocodingResponse =
            serde_json::from_str(body).map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        let total = raw.features.len();
        let candidates: Vec<_> = raw
            .features
            .into_iter()
            .filter_map(Self::convert_feature)
            .collect();

        if candidates.len() < total {
            warn!(
                dropped = total - candidates.len(),
                "Skipped geocoding features without coordinates"
            );
        }
        Ok(candidates)
    }
}

#[async_trait]
impl GeocodingClient for MapboxGeocodingClient {
    #[instrument(skip(self))]
    async fn search(&self, query: &str) -> Result<Vec<PlaceCandidate>, GeocodingError> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            debug!("Query too short, skipping geocoding");
            return Ok(Vec::new());
        }

        let cache_key = query.to_lowercase();
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(&cache_key).await {
                debug!(count = hit.len(), "Geocoding cache hit");
                return Ok(hit);
            }
        }

        let url = self.search_url(query)?;
        let limit = self.config.result_limit.to_string();
        let mut params = vec![
            ("access_token", self.config.access_token.as_str()),
            ("limit", limit.as_str()),
            ("autocomplete", "true"),
        ];
        if !self.config.country_filter.is_empty() {
            params.push(("country", self.config.country_filter.as_str()));
        }

        debug!(path = url.path(), "Geocoding query");

        let response = self
            .client
            .get(url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeocodingError::Timeout {
                        timeout_secs: self.config.timeout_secs,
                    }
                } else {
                    GeocodingError::ConnectionFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodingError::RateLimitExceeded {
                retry_after_secs: retry_after_secs(response.headers()),
            });
        }

        if !status.is_success() {
            return Err(GeocodingError::RequestFailed(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        let candidates = Self::parse_response(&body)?;
        debug!(count = candidates.len(), "Geocoding candidates found");

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, candidates.clone()).await;
        }
        Ok(candidates)
    }
}
