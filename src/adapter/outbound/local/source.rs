//! Models living directly under a local directory.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::warn;

use crate::domain::{model_name_for_entry, ModelDescriptor, ModelName, SourceKind};
use crate::error::{Error, ModelError, Result};
use crate::port::outbound::source::ModelSource;

pub struct LocalDirectorySource {
    dir: PathBuf,
}

impl LocalDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn scan(dir: &Path) -> std::io::Result<BTreeMap<ModelName, ModelDescriptor>> {
    let mut models = BTreeMap::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_dir = entry.file_type()?.is_dir();
        if let Some(name) = model_name_for_entry(&path, is_dir) {
            models.insert(name.clone(), ModelDescriptor::local(name, &path));
        }
    }
    Ok(models)
}

#[async_trait]
impl ModelSource for LocalDirectorySource {
    fn kind(&self) -> SourceKind {
        SourceKind::Local
    }

    async fn list(&self) -> Result<BTreeMap<ModelName, ModelDescriptor>> {
        let dir = self.dir.clone();
        let scanned = tokio::task::spawn_blocking(move || scan(&dir))
            .await
            .map_err(|e| Error::Io(std::io::Error::other(e)))?;
        match scanned {
            Ok(models) => Ok(models),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(dir = %self.dir.display(), "Models directory does not exist");
                Ok(BTreeMap::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn materialize(&self, descriptor: &ModelDescriptor) -> Result<PathBuf> {
        descriptor.local_path().ok_or_else(|| {
            ModelError::NotFound {
                name: descriptor.name.to_string(),
            }
            .into()
        })
    }
}
