//! Dashboard lifecycle states.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host-reported lifecycle state of the widget.
///
/// `Unknown` is the safe default whenever the bridge reports nothing
/// usable; the widget behaves as if it were outside any dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DashboardState {
    Create,
    Config,
    View,
    FullScreen,
    #[default]
    Unknown,
}

impl DashboardState {
    /// Parse the host's state string; anything unrecognized is `Unknown`.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "Create" => Self::Create,
            "Config" => Self::Config,
            "View" => Self::View,
            "FullScreen" => Self::FullScreen,
            _ => Self::Unknown,
        }
    }

    /// Read-only presentation states: formal data, polling allowed.
    pub fn is_display(self) -> bool {
        matches!(self, Self::View | Self::FullScreen)
    }

    /// States where the selector form is shown and preview data is used.
    pub fn is_configuring(self) -> bool {
        matches!(self, Self::Create | Self::Config)
    }
}

impl fmt::Display for DashboardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "Create",
            Self::Config => "Config",
            Self::View => "View",
            Self::FullScreen => "FullScreen",
            Self::Unknown => "Unknown",
        })
    }
}
