//! Per-model inference container types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable record of the container serving one model.
///
/// Persisted across control-plane restarts, but only meaningful while the
/// container engine still knows the referenced container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerRecord {
    pub model_name: String,
    pub container_id: String,
    pub container_name: String,
    /// URL that accepts prediction requests.
    pub serving_endpoint: String,
    /// URL polled for readiness.
    pub status_endpoint: String,
    /// Host port published for the container, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_port: Option<u16>,
    pub created_at: DateTime<Utc>,
}

/// Lifecycle state as reported by the container engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerState {
    Created,
    Running,
    Restarting,
    Paused,
    Exited,
    Removing,
    Dead,
    Unknown,
}

impl ContainerState {
    /// Parse the engine's status string (e.g. `running`, `exited`).
    #[must_use]
    pub fn from_status(status: &str) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "created" => Self::Created,
            "running" => Self::Running,
            "restarting" => Self::Restarting,
            "paused" => Self::Paused,
            "exited" => Self::Exited,
            "removing" => Self::Removing,
            "dead" => Self::Dead,
            _ => Self::Unknown,
        }
    }

    /// Whether a container in this state can be reused as-is.
    #[must_use]
    pub const fn is_runnable(self) -> bool {
        matches!(self, Self::Running | Self::Created)
    }
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Restarting => "restarting",
            Self::Paused => "paused",
            Self::Exited => "exited",
            Self::Removing => "removing",
            Self::Dead => "dead",
            Self::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Live view of a container as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSummary {
    pub id: String,
    pub name: String,
    pub state: ContainerState,
    /// Value of the `model_name` label, when present.
    pub model_name: Option<String>,
}

impl ContainerSummary {
    /// Whether `reference` names this container by id (full or short) or name.
    #[must_use]
    pub fn matches(&self, reference: &str) -> bool {
        if reference.is_empty() {
            return false;
        }
        self.name == reference
            || self.name.trim_start_matches('/') == reference
            || self.id.starts_with(reference)
            || reference.starts_with(&self.id)
    }
}

/// Orchestrator view of a model's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContainerPhase {
    #[default]
    Absent,
    Starting,
    Available,
}

/// Outcome of a full-system container sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Names of containers that were removed.
    pub removed: Vec<String>,
    /// Containers that could not be removed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl SweepReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}
