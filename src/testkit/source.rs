//! Static model source standing in for a remote repository or registry.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{ModelDescriptor, ModelName, SourceKind};
use crate::error::{Error, Result};
use crate::port::outbound::source::ModelSource;

/// Serves a fixed catalog. Materializing writes a one-file model under
/// `models_dir`.
pub struct StaticSource {
    kind: SourceKind,
    models_dir: PathBuf,
    catalog: Mutex<BTreeMap<ModelName, ModelDescriptor>>,
    failing: Mutex<BTreeSet<String>>,
    lookups: Mutex<Vec<String>>,
    materialized: Mutex<Vec<String>>,
}

impl StaticSource {
    pub fn new(models_dir: impl Into<PathBuf>) -> Self {
        Self::of_kind(SourceKind::RemoteRepo, models_dir)
    }

    pub fn of_kind(kind: SourceKind, models_dir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            models_dir: models_dir.into(),
            catalog: Mutex::new(BTreeMap::new()),
            failing: Mutex::new(BTreeSet::new()),
            lookups: Mutex::new(Vec::new()),
            materialized: Mutex::new(Vec::new()),
        }
    }

    /// Add or replace a catalog entry.
    pub fn publish(&self, name: &str) {
        let descriptor = ModelDescriptor::remote(name, self.kind, name);
        self.catalog.lock().insert(ModelName::new(name), descriptor);
    }

    pub fn unpublish(&self, name: &str) {
        self.catalog.lock().remove(name);
    }

    /// Fail lookups and downloads of `name`.
    pub fn fail(&self, name: &str) {
        self.failing.lock().insert(name.to_string());
    }

    /// Names looked up individually, in order.
    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().clone()
    }

    pub fn materialized(&self) -> Vec<String> {
        self.materialized.lock().clone()
    }

    fn check(&self, name: &str) -> Result<()> {
        if self.failing.lock().contains(name) {
            return Err(Error::RemoteFetch(format!("{name}: 502 Bad Gateway")));
        }
        Ok(())
    }
}

#[async_trait]
impl ModelSource for StaticSource {
    fn kind(&self) -> SourceKind {
        self.kind
    }

    async fn list(&self) -> Result<BTreeMap<ModelName, ModelDescriptor>> {
        Ok(self.catalog.lock().clone())
    }

    async fn lookup(&self, name: &ModelName) -> Result<Option<ModelDescriptor>> {
        self.lookups.lock().push(name.to_string());
        self.check(name.as_str())?;
        Ok(self.catalog.lock().get(name).cloned())
    }

    async fn materialize(&self, descriptor: &ModelDescriptor) -> Result<PathBuf> {
        let name = descriptor.name.as_str();
        self.check(name)?;
        self.materialized.lock().push(name.to_string());

        tokio::fs::create_dir_all(&self.models_dir).await?;
        let target = self.models_dir.join(name);
        tokio::fs::write(&target, format!("weights for {name}")).await?;
        Ok(target)
    }
}
