//! Container engine port.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::domain::ContainerSummary;
use crate::error::Result;

/// Label carrying the served model's name on every owned container.
pub const MODEL_NAME_LABEL: &str = "model_name";

/// A bind mount from the host into a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mount {
    pub host_path: PathBuf,
    pub container_path: String,
    pub read_only: bool,
}

/// Port publication from the host into a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortBinding {
    pub host_port: u16,
    pub container_port: u16,
}

/// Everything needed to launch one detached container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    pub labels: BTreeMap<String, String>,
    pub env: BTreeMap<String, String>,
    pub mounts: Vec<Mount>,
    pub port: Option<PortBinding>,
    /// Network to attach to instead of publishing ports.
    pub network: Option<String>,
    /// Arguments passed to the image entrypoint.
    pub args: Vec<String>,
}

#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Look up a container by id or name. `Ok(None)` when it does not exist.
    async fn inspect(&self, reference: &str) -> Result<Option<ContainerSummary>>;

    /// Start a detached container and return its id.
    async fn run(&self, spec: &ContainerSpec) -> Result<String>;

    /// Forcibly remove a container. Returns `false` if it did not exist.
    async fn remove_force(&self, reference: &str) -> Result<bool>;

    /// List all containers (running or not) carrying `key=value`.
    async fn list_by_label(&self, key: &str, value: &str) -> Result<Vec<ContainerSummary>>;

    /// Copy `source` out of `image` into the host path `target`, pulling the
    /// image if needed. `target` must not exist yet.
    async fn copy_from_image(&self, image: &str, source: &str, target: &Path) -> Result<()>;
}
