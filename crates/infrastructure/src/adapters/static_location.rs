//! Static location provider - Implements LocationPort from configuration
//!
//! Stands in for a device location service: a configured fix means access
//! is granted and that fix is returned; no fix means access is denied.

use application::error::MapError;
use application::ports::{LocationAccuracy, LocationPort, PermissionStatus};
use async_trait::async_trait;
use domain::GeoPoint;
use tracing::debug;

/// Location provider backed by a fixed position
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticLocationProvider {
    fix: Option<GeoPoint>,
}

impl StaticLocationProvider {
    /// Provider that always reports `fix`
    #[must_use]
    pub const fn new(fix: GeoPoint) -> Self {
        Self { fix: Some(fix) }
    }

    /// Provider whose permission request is always denied
    #[must_use]
    pub const fn denied() -> Self {
        Self { fix: None }
    }

    /// Provider from an optional fix
    #[must_use]
    pub const fn from_fix(fix: Option<GeoPoint>) -> Self {
        Self { fix }
    }
}

#[async_trait]
impl LocationPort for StaticLocationProvider {
    async fn request_permission(&self) -> PermissionStatus {
        if self.fix.is_some() {
            PermissionStatus::Granted
        } else {
            debug!("No location configured, denying permission");
            PermissionStatus::Denied
        }
    }

    async fn current_position(&self, accuracy: LocationAccuracy) -> Result<GeoPoint, MapError> {
        debug!(?accuracy, "Reading configured location");
        self.fix.ok_or_else(|| {
            MapError::LocationUnavailable("no location configured".to_string())
        })
    }
}
