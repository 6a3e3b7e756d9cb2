//! Builders for domain primitives and on-disk artifacts.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::domain::{ContainerRecord, ContainerState, ContainerSummary, ModelDescriptor, SourceKind};

/// Descriptor for a local model stored at `dir/name`.
pub fn local(dir: &Path, name: &str) -> ModelDescriptor {
    ModelDescriptor::local(name, &dir.join(name))
}

/// Descriptor for a model at the root of a remote repository.
pub fn remote(name: &str) -> ModelDescriptor {
    ModelDescriptor::remote(name, SourceKind::RemoteRepo, name)
}

/// Write a minimal SavedModel layout (`name/1/saved_model.pb`) under `dir`.
pub fn saved_model(dir: &Path, name: &str) -> io::Result<PathBuf> {
    let path = dir.join(name);
    fs::create_dir_all(path.join("1/variables"))?;
    fs::write(path.join("1/saved_model.pb"), b"graph")?;
    Ok(path)
}

/// Write a single-file artifact under `dir`.
pub fn artifact(dir: &Path, name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    fs::write(&path, bytes)?;
    Ok(path)
}

/// Persisted record for a container named `tf_{model}`.
pub fn record(model: &str, container_id: &str) -> ContainerRecord {
    ContainerRecord {
        model_name: model.into(),
        container_id: container_id.into(),
        container_name: format!("tf_{model}"),
        serving_endpoint: format!("http://tf_{model}:8501/v1/models/{model}:predict"),
        status_endpoint: format!("http://tf_{model}:8501/v1/models/{model}"),
        host_port: None,
        created_at: Utc::now(),
    }
}

/// Engine view of a container serving `model`.
pub fn summary(id: &str, model: &str, state: ContainerState) -> ContainerSummary {
    ContainerSummary {
        id: id.into(),
        name: format!("tf_{model}"),
        state,
        model_name: Some(model.into()),
    }
}
