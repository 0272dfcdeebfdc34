//! Transient user-visible notices
//!
//! Failures on the map screen never block interaction; they surface as
//! dismissible notices the view drains or dismisses by id.

use chrono::{DateTime, Utc};
use domain::{EndpointRole, OverlayKind};
use serde::Serialize;
use uuid::Uuid;

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    /// Confirmation of a user action
    Info,
    /// A non-fatal failure or degraded result
    Warning,
}

/// The subsystem a notice originates from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "target", rename_all = "snake_case")]
pub enum NoticeSource {
    /// Place search for one endpoint role
    Search(EndpointRole),
    /// Directions lookup
    Route,
    /// One overlay layer
    Overlay(OverlayKind),
    /// Device location
    Location,
}

/// A dismissible, non-modal message for the user
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    /// Identifier used to dismiss the notice
    pub id: Uuid,
    /// Severity
    pub level: NoticeLevel,
    /// Originating subsystem
    pub source: NoticeSource,
    /// Short title
    pub title: String,
    /// Message body
    pub message: String,
    /// When the notice was raised
    pub issued_at: DateTime<Utc>,
}

impl Notice {
    /// Create a warning notice
    #[must_use]
    pub fn warning(
        source: NoticeSource,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(NoticeLevel::Warning, source, title, message)
    }

    /// Create an informational notice
    #[must_use]
    pub fn info(source: NoticeSource, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, source, title, message)
    }

    fn new(
        level: NoticeLevel,
        source: NoticeSource,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            level,
            source,
            title: title.into(),
            message: message.into(),
            issued_at: Utc::now(),
        }
    }
}
