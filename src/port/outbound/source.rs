//! Model source port.
//!
//! A source lists the models discoverable at one origin and can materialize
//! a descriptor into a local artifact path.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;

use crate::domain::{ModelDescriptor, ModelName, SourceKind};
use crate::error::Result;

#[async_trait]
pub trait ModelSource: Send + Sync {
    /// Which origin this source represents.
    fn kind(&self) -> SourceKind;

    /// List every model currently discoverable at this origin.
    async fn list(&self) -> Result<BTreeMap<ModelName, ModelDescriptor>>;

    /// Describe a single model. Sources that can query one entry cheaply
    /// should override this; the default filters a full listing.
    async fn lookup(&self, name: &ModelName) -> Result<Option<ModelDescriptor>> {
        Ok(self.list().await?.remove(name))
    }

    /// Produce a local path for the descriptor, downloading if required.
    async fn materialize(&self, descriptor: &ModelDescriptor) -> Result<PathBuf>;
}
