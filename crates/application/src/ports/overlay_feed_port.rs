//! Overlay feed port
//!
//! One port serves all accessibility layers; adapters dispatch on the layer to
//! the backend that publishes it and normalize records into [`OverlayPoint`]s.
//! Records without usable geometry are dropped by the adapter, never reported
//! as errors.

use async_trait::async_trait;
use domain::{BoundingBox, OverlayKind, OverlayPoint};
#[cfg(test)]
use mockall::automock;

use crate::error::MapError;

/// Port for fetching accessibility overlay points
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OverlayFeedPort: Send + Sync {
    /// Fetch the points of `layer`
    ///
    /// `region` scopes viewport-based layers; fixed-query layers ignore it.
    async fn fetch(
        &self,
        layer: OverlayKind,
        region: &BoundingBox,
    ) -> Result<Vec<OverlayPoint>, MapError>;
}
