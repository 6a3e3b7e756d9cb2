//! Model descriptors and runtime state.
//!
//! A [`ModelDescriptor`] describes a model some source knows about. Once the
//! model runtime has loaded it, the descriptor is joined with the runtime
//! handle and loader-reported info into an [`ActiveModel`].

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::ModelName;

/// Where a model was discovered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A file or directory under the local models directory.
    Local,
    /// An entry in a remote repository (e.g. a GitHub repo).
    RemoteRepo,
    /// An artifact in a container/artifact registry.
    RegistrySource,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Local => "local",
            Self::RemoteRepo => "remote_repo",
            Self::RegistrySource => "registry_source",
        };
        f.write_str(label)
    }
}

/// A model known to the system, regardless of whether it is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDescriptor {
    /// Unique model name.
    pub name: ModelName,
    /// Origin of the model.
    pub source: SourceKind,
    /// Local path for local models, remote identifier otherwise.
    pub location: String,
    /// When the model was first observed.
    pub discovered_at: DateTime<Utc>,
}

impl ModelDescriptor {
    /// Describe a model living on the local filesystem.
    pub fn local(name: impl Into<ModelName>, path: &Path) -> Self {
        Self {
            name: name.into(),
            source: SourceKind::Local,
            location: path.to_string_lossy().into_owned(),
            discovered_at: Utc::now(),
        }
    }

    /// Describe a model held by a remote origin.
    pub fn remote(
        name: impl Into<ModelName>,
        source: SourceKind,
        location: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            source,
            location: location.into(),
            discovered_at: Utc::now(),
        }
    }

    /// Local path of the artifact, if the model lives on local disk.
    #[must_use]
    pub fn local_path(&self) -> Option<PathBuf> {
        match self.source {
            SourceKind::Local => Some(PathBuf::from(&self.location)),
            SourceKind::RemoteRepo | SourceKind::RegistrySource => None,
        }
    }
}

/// Loader-reported information about a model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Human-readable model format (e.g. `tensorflow-savedmodel`).
    pub format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_schema: Option<Value>,
    /// Format-specific details (serving endpoints, notes).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

impl ModelInfo {
    pub fn new(format: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Handle through which a loaded model is invoked.
#[derive(Clone)]
pub enum ModelHandle {
    /// An object owned by the model runtime inside this process.
    InProcess(Arc<dyn Any + Send + Sync>),
    /// A model served by an external process.
    Remote { predict_url: String },
}

impl ModelHandle {
    /// Remote serving URL, if this handle points at one.
    #[must_use]
    pub fn predict_url(&self) -> Option<&str> {
        match self {
            Self::Remote { predict_url } => Some(predict_url),
            Self::InProcess(_) => None,
        }
    }
}

impl fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InProcess(_) => f.write_str("InProcess(..)"),
            Self::Remote { predict_url } => f
                .debug_struct("Remote")
                .field("predict_url", predict_url)
                .finish(),
        }
    }
}

/// Result of a successful model runtime `detect`.
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub info: ModelInfo,
    pub handle: ModelHandle,
}

/// A model that is loaded and eligible to serve predictions.
#[derive(Debug, Clone)]
pub struct ActiveModel {
    pub descriptor: ModelDescriptor,
    pub handle: ModelHandle,
    pub info: ModelInfo,
    /// Resolved local path the runtime loaded from.
    pub path: PathBuf,
    pub activated_at: DateTime<Utc>,
}

impl ActiveModel {
    #[must_use]
    pub fn name(&self) -> &ModelName {
        &self.descriptor.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_descriptor_exposes_path() {
        let descriptor = ModelDescriptor::local("fire", Path::new("/models/fire"));
        assert_eq!(descriptor.source, SourceKind::Local);
        assert_eq!(descriptor.local_path(), Some(PathBuf::from("/models/fire")));
    }

    #[test]
    fn remote_descriptor_has_no_local_path() {
        let descriptor = ModelDescriptor::remote("fire", SourceKind::RemoteRepo, "fire");
        assert!(descriptor.local_path().is_none());
    }

    #[test]
    fn source_kind_serializes_snake_case() {
        let json = serde_json::to_string(&SourceKind::RegistrySource).unwrap();
        assert_eq!(json, "\"registry_source\"");
        assert_eq!(SourceKind::RemoteRepo.to_string(), "remote_repo");
    }

    #[test]
    fn handle_debug_hides_in_process_object() {
        let handle = ModelHandle::InProcess(Arc::new(42_u32));
        assert_eq!(format!("{handle:?}"), "InProcess(..)");
        assert!(handle.predict_url().is_none());
    }

    #[test]
    fn model_info_details_builder() {
        let info = ModelInfo::new("tensorflow-savedmodel").with_detail("host_port", 8501);
        assert_eq!(info.details.get("host_port"), Some(&Value::from(8501)));
    }
}
