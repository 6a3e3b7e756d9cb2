//! Model activation, deactivation and full removal.
//!
//! Every operation on a given name runs under that name's lock, so racing
//! activations of the same model are serialized: the second caller waits and
//! then observes the model as already active. The registry lock is only ever
//! taken for the short commit steps, never across the loader, downloads or
//! container calls.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};

use super::container::ContainerOrchestrator;
use super::locks::NameLocks;
use super::registry::{ActivationCommit, ModelRegistry};
use super::watcher::stability::{self, StabilizationConfig};
use crate::domain::{
    ActiveModel, ModelDescriptor, ModelHandle, SourceKind, StepReport, TeardownReport,
    TeardownStep,
};
use crate::error::{Error, ModelError, Result};
use crate::port::outbound::runtime::ModelRuntime;
use crate::port::outbound::source::ModelSource;

/// Configuration for the lifecycle manager.
#[derive(Debug, Clone)]
pub struct LifecycleConfig {
    /// Root under which model artifacts live.
    pub models_dir: PathBuf,
    /// Guard applied to local artifacts before loading.
    pub stabilization: StabilizationConfig,
}

/// Successful outcome of [`LifecycleManager::activate`].
#[derive(Debug, Clone)]
pub enum Activation {
    /// The model was loaded and committed by this call.
    Activated(ActiveModel),
    /// The model was already active; nothing was loaded.
    AlreadyActive(ActiveModel),
}

impl Activation {
    #[must_use]
    pub fn model(&self) -> &ActiveModel {
        match self {
            Self::Activated(model) | Self::AlreadyActive(model) => model,
        }
    }

    #[must_use]
    pub fn is_new(&self) -> bool {
        matches!(self, Self::Activated(_))
    }
}

/// Outcome of [`LifecycleManager::deactivate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deactivation {
    /// The model was not active.
    NotActive,
    /// The model left the active set. `stop_error` records a failed
    /// container stop, which never blocks the removal.
    Deactivated { stop_error: Option<String> },
}

/// Coordinates the model runtime, sources and container orchestrator.
pub struct LifecycleManager {
    config: LifecycleConfig,
    registry: Arc<ModelRegistry>,
    runtime: Arc<dyn ModelRuntime>,
    orchestrator: Arc<ContainerOrchestrator>,
    sources: HashMap<SourceKind, Arc<dyn ModelSource>>,
    locks: NameLocks,
}

impl LifecycleManager {
    pub fn new(
        config: LifecycleConfig,
        registry: Arc<ModelRegistry>,
        runtime: Arc<dyn ModelRuntime>,
        orchestrator: Arc<ContainerOrchestrator>,
    ) -> Self {
        Self {
            config,
            registry,
            runtime,
            orchestrator,
            sources: HashMap::new(),
            locks: NameLocks::new(),
        }
    }

    /// Register the source that materializes descriptors of its kind.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn ModelSource>) -> Self {
        self.sources.insert(source.kind(), source);
        self
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<ModelRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn runtime(&self) -> &Arc<dyn ModelRuntime> {
        &self.runtime
    }

    #[must_use]
    pub fn models_dir(&self) -> &Path {
        &self.config.models_dir
    }

    /// Load an available model and commit it to the active set.
    ///
    /// Nothing is committed unless the runtime loaded the artifact. If the
    /// model is unregistered while loading, the fresh handle and its
    /// container are released before `NotFound` is returned.
    pub async fn activate(&self, name: &str) -> Result<Activation> {
        let _guard = self.locks.acquire(name).await;

        let descriptor = self.registry.descriptor(name).ok_or_else(|| {
            Error::from(ModelError::NotFound {
                name: name.to_string(),
            })
        })?;
        if let Some(active) = self.registry.active(name) {
            debug!(model = %name, "Model already active");
            return Ok(Activation::AlreadyActive(active));
        }

        let path = self.resolve_path(&descriptor).await?;
        if descriptor.source == SourceKind::Local {
            self.await_stable(&path).await?;
        }

        let loaded = match self.runtime.detect(name, &path).await {
            Ok(Some(loaded)) => loaded,
            Ok(None) => {
                warn!(model = %name, path = %path.display(), "Unsupported model format");
                return Err(ModelError::UnsupportedFormat { path }.into());
            }
            Err(e) => {
                warn!(model = %name, error = %e, "Model failed to load");
                return Err(e);
            }
        };

        let model = ActiveModel {
            descriptor,
            handle: loaded.handle,
            info: loaded.info,
            path,
            activated_at: Utc::now(),
        };

        match self.registry.activate(model.clone()) {
            Ok(ActivationCommit::Inserted) => {
                info!(model = %name, format = %model.info.format, "Model activated");
                Ok(Activation::Activated(model))
            }
            Ok(ActivationCommit::AlreadyActive) => {
                let existing = self.registry.active(name).unwrap_or(model);
                Ok(Activation::AlreadyActive(existing))
            }
            Err(e) => {
                warn!(model = %name, "Model disappeared while loading, releasing resources");
                if let Some(reason) = self.release(name, &model.path, &model.handle).await {
                    warn!(model = %name, error = %reason, "Failed to release discarded model");
                }
                Err(e)
            }
        }
    }

    /// Remove a model from the active set and stop its backing container.
    ///
    /// The active-set removal always happens; a failed stop is reported in
    /// the outcome and left for the shutdown sweep.
    pub async fn deactivate(&self, name: &str) -> Deactivation {
        let _guard = self.locks.acquire(name).await;
        self.deactivate_locked(name).await
    }

    /// Deactivate every active model, for shutdown.
    pub async fn deactivate_all(&self) -> usize {
        let names: Vec<_> = self.registry.active_models().into_keys().collect();
        let mut count = 0;
        for name in names {
            if matches!(
                self.deactivate(name.as_str()).await,
                Deactivation::Deactivated { .. }
            ) {
                count += 1;
            }
        }
        count
    }

    /// Deactivate, unregister and delete on-disk artifacts.
    ///
    /// Each step runs even when an earlier one failed; the report lists the
    /// steps that left residue.
    pub async fn remove_completely(&self, name: &str) -> TeardownReport {
        let _guard = self.locks.acquire(name).await;
        let descriptor = self.registry.descriptor(name);
        let mut report = TeardownReport::new(name);

        report.push(match self.deactivate_locked(name).await {
            Deactivation::Deactivated {
                stop_error: Some(reason),
            } => StepReport::failed(TeardownStep::Deactivate, reason),
            _ => StepReport::ok(TeardownStep::Deactivate),
        });

        self.registry.unregister(name);
        report.push(StepReport::ok(TeardownStep::Unregister));

        report.push(match self.delete_artifacts(name, descriptor.as_ref()).await {
            Ok(()) => StepReport::ok(TeardownStep::DeleteArtifacts),
            Err(e) => StepReport::failed(TeardownStep::DeleteArtifacts, e),
        });

        if report.is_clean() {
            info!(model = %name, "Model removed");
        } else {
            for step in report.failures() {
                warn!(
                    model = %name,
                    step = %step.step,
                    error = step.error.as_deref().unwrap_or_default(),
                    "Model removal left residue"
                );
            }
        }
        report
    }

    async fn deactivate_locked(&self, name: &str) -> Deactivation {
        let Some(active) = self.registry.deactivate(name) else {
            debug!(model = %name, "Model not active");
            return Deactivation::NotActive;
        };
        let stop_error = self.release(name, &active.path, &active.handle).await;
        if let Some(reason) = &stop_error {
            warn!(model = %name, error = %reason, "Failed to stop backing container");
        }
        Deactivation::Deactivated { stop_error }
    }

    /// Release a handle and stop any container serving `name`.
    ///
    /// Returns the first failure, if any.
    async fn release(&self, name: &str, path: &Path, handle: &ModelHandle) -> Option<String> {
        let released = self.runtime.release(path, handle).await;
        let stopped = self.orchestrator.stop(name).await;
        match (released, stopped) {
            (Err(e), _) | (Ok(()), Err(e)) => Some(e.to_string()),
            (Ok(()), Ok(_)) => None,
        }
    }

    async fn resolve_path(&self, descriptor: &ModelDescriptor) -> Result<PathBuf> {
        if let Some(path) = descriptor.local_path() {
            if !path.exists() {
                return Err(ModelError::LoadFailed {
                    name: descriptor.name.to_string(),
                    reason: format!("artifact missing at {}", path.display()),
                }
                .into());
            }
            return Ok(path);
        }

        let source = self.sources.get(&descriptor.source).ok_or_else(|| {
            Error::RemoteFetch(format!("no source configured for {}", descriptor.source))
        })?;
        debug!(model = %descriptor.name, source = %descriptor.source, "Materializing model");
        source.materialize(descriptor).await
    }

    async fn await_stable(&self, path: &Path) -> Result<()> {
        if stability::wait_until_stable(path, &self.config.stabilization).await? {
            Ok(())
        } else {
            Err(ModelError::Unstable {
                path: path.to_path_buf(),
            }
            .into())
        }
    }

    /// Paths that may hold artifacts for `name`, all inside the models dir.
    fn artifact_paths(&self, name: &str, descriptor: Option<&ModelDescriptor>) -> Vec<PathBuf> {
        let root = &self.config.models_dir;
        let mut paths = Vec::new();
        if is_single_component(name) {
            paths.push(root.join(name));
        }
        if let Some(path) = descriptor.and_then(ModelDescriptor::local_path) {
            if path.starts_with(root) && path != *root && !paths.contains(&path) {
                paths.push(path);
            }
        }
        paths
    }

    async fn delete_artifacts(&self, name: &str, descriptor: Option<&ModelDescriptor>) -> Result<()> {
        let mut first_error = None;
        for path in self.artifact_paths(name, descriptor) {
            if let Err(e) = remove_path(&path).await {
                warn!(model = %name, path = %path.display(), error = %e, "Failed to delete artifact");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

fn is_single_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

async fn remove_path(path: &Path) -> Result<()> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    if metadata.is_dir() {
        tokio::fs::remove_dir_all(path).await?;
    } else {
        tokio::fs::remove_file(path).await?;
    }
    debug!(path = %path.display(), "Deleted artifact");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_component_names() {
        assert!(is_single_component("fire"));
        assert!(is_single_component("fire.h5"));
        assert!(!is_single_component(".."));
        assert!(!is_single_component("a/b"));
        assert!(!is_single_component(""));
    }

    #[test]
    fn activation_accessors() {
        let model = ActiveModel {
            descriptor: ModelDescriptor::local("fire", Path::new("/models/fire")),
            handle: ModelHandle::Remote {
                predict_url: "http://localhost:8501/v1/models/fire:predict".into(),
            },
            info: crate::domain::ModelInfo::new("test"),
            path: PathBuf::from("/models/fire"),
            activated_at: Utc::now(),
        };
        let activation = Activation::Activated(model.clone());
        assert!(activation.is_new());
        assert_eq!(activation.model().name().as_str(), "fire");
        assert!(!Activation::AlreadyActive(model).is_new());
    }
}
