//! Model runtime port.
//!
//! The model runtime knows how to interpret model artifacts. The control
//! plane treats it as opaque: it asks the runtime to load an artifact and
//! later to run a prediction through the returned handle.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{LoadedModel, ModelHandle};
use crate::error::Result;

#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Load the artifact at `path` for the model registered as `name`.
    ///
    /// Anything the runtime keys by model, such as a serving container, uses
    /// `name` rather than the artifact's file name. Returns `Ok(None)` when
    /// the runtime does not recognise the artifact.
    async fn detect(&self, name: &str, path: &Path) -> Result<Option<LoadedModel>>;

    /// Run a prediction against a loaded model.
    ///
    /// Fails with a typed model error for an unsupported format or an input
    /// that does not match the model's expected shape.
    async fn predict(&self, path: &Path, handle: &ModelHandle, input: Value) -> Result<Value>;

    /// Release a handle leaving the active set, or one that was never committed.
    async fn release(&self, path: &Path, handle: &ModelHandle) -> Result<()> {
        let _ = (path, handle);
        Ok(())
    }
}
