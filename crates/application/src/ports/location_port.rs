//! Device location port

use async_trait::async_trait;
use domain::GeoPoint;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::MapError;

/// Outcome of a foreground location permission request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionStatus {
    /// Access granted
    Granted,
    /// Access denied (or not yet determined and refused)
    Denied,
}

/// Requested fix accuracy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationAccuracy {
    /// Cell/wifi level accuracy
    Balanced,
    /// GPS level accuracy
    #[default]
    High,
}

/// Port for the device location service
#[cfg_attr(test, automock)]
#[async_trait]
pub trait LocationPort: Send + Sync {
    /// Ask for foreground location access
    async fn request_permission(&self) -> PermissionStatus;

    /// Obtain a single position fix
    async fn current_position(&self, accuracy: LocationAccuracy) -> Result<GeoPoint, MapError>;
}
