//! Endpoint role - which end of the route a selection belongs to

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two route endpoints the map screen lets the user pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointRole {
    /// Route origin
    #[default]
    Start,
    /// Route destination
    End,
}

impl EndpointRole {
    /// Both roles in display order
    pub const ALL: [Self; 2] = [Self::Start, Self::End];

    /// The opposite role
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Start => Self::End,
            Self::End => Self::Start,
        }
    }

    /// Capitalized label shown on markers and notices
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Start => "Start",
            Self::End => "End",
        }
    }

    /// Parse from a user-supplied string (case-insensitive)
    #[must_use]
    pub fn from_config(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "start" | "from" | "origin" => Some(Self::Start),
            "end" | "to" | "destination" => Some(Self::End),
            _ => None,
        }
    }
}

impl fmt::Display for EndpointRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
