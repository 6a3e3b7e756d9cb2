//! Serving backend port.
//!
//! Model runtimes that serve out-of-process ask a backend for a ready
//! serving endpoint instead of loading weights themselves.

use std::path::Path;

use async_trait::async_trait;

use crate::domain::ContainerRecord;
use crate::error::Result;

#[async_trait]
pub trait ServingBackend: Send + Sync {
    /// Make sure a ready server for `model` is serving the artifact at `path`.
    async fn ensure(&self, model: &str, path: &Path) -> Result<ContainerRecord>;
}
