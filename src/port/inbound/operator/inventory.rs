//! Model and container inventory projections for operator-facing adapters.

use async_trait::async_trait;

use crate::error::Result;

/// One discoverable model.
#[derive(Debug, Clone)]
pub struct ModelEntry {
    pub name: String,
    /// Source kind label (`local`, `remote_repo`, ...).
    pub source: String,
    pub location: String,
}

/// One owned container, live or only persisted.
#[derive(Debug, Clone)]
pub struct ContainerEntry {
    pub name: String,
    pub id: Option<String>,
    pub model: Option<String>,
    /// Engine state, `None` when the container no longer exists.
    pub state: Option<String>,
    pub serving_endpoint: Option<String>,
    /// Whether the persisted registry holds a record for it.
    pub persisted: bool,
}

/// Result of force-removing every owned container.
#[derive(Debug, Clone, Default)]
pub struct SweepSummary {
    pub removed: Vec<String>,
    /// `(container, reason)` pairs that could not be removed.
    pub failed: Vec<(String, String)>,
}

/// Inventory use-cases for operator-facing adapters.
#[async_trait]
pub trait InventoryOperator: Send + Sync {
    /// Models discoverable from every configured source, sorted by name.
    async fn list_models(&self, config_toml: &str) -> Result<Vec<ModelEntry>>;

    /// Owned containers merged with the persisted registry.
    async fn list_containers(&self, config_toml: &str) -> Result<Vec<ContainerEntry>>;

    /// Force-remove every owned container.
    async fn sweep_containers(&self, config_toml: &str) -> Result<SweepSummary>;
}
