//! Deployment profile.

use serde::Deserialize;

use crate::application::container::Addressing;

/// Where serving containers are reachable from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// Publish a free host port and address containers via `localhost`.
    #[default]
    Host,
    /// Join an overlay network and address containers by name.
    Overlay,
}

impl Profile {
    /// Endpoint addressing for this profile.
    #[must_use]
    pub fn addressing(self, port_range: (u16, u16), network: &str) -> Addressing {
        match self {
            Self::Host => Addressing::HostPort {
                start: port_range.0,
                end: port_range.1,
            },
            Self::Overlay => Addressing::Overlay {
                network: network.to_string(),
            },
        }
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Host => write!(f, "host"),
            Self::Overlay => write!(f, "overlay"),
        }
    }
}
