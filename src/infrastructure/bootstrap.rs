//! Infrastructure bootstrap helpers for runtime wiring.
//!
//! [`Components::build`] wires the production adapters from configuration;
//! [`Components::assemble`] takes the outbound ports explicitly so the same
//! wiring runs against test doubles.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::adapter::outbound::docker::DockerCli;
use crate::adapter::outbound::github::GitHubSource;
use crate::adapter::outbound::harbor::HarborSource;
use crate::adapter::outbound::http::TfServingProbe;
use crate::adapter::outbound::local::LocalDirectorySource;
use crate::adapter::outbound::runtime::ServingRuntime;
use crate::adapter::outbound::store::JsonRecordStore;
use crate::application::container::ContainerOrchestrator;
use crate::application::control::ControlPlane;
use crate::application::lifecycle::LifecycleManager;
use crate::application::registry::ModelRegistry;
use crate::application::sync::SyncHandler;
use crate::application::watcher::FilesystemWatcher;
use crate::application::webhook::WebhookReconciler;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::engine::ContainerEngine;
use crate::port::outbound::probe::ReadinessProbe;
use crate::port::outbound::runtime::ModelRuntime;
use crate::port::outbound::source::ModelSource;
use crate::port::outbound::store::ContainerRecordStore;

/// Per-request timeout of a single readiness probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-request timeout of a forwarded prediction.
const PREDICT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outbound ports the control plane is wired against.
pub struct Adapters {
    pub engine: Arc<dyn ContainerEngine>,
    pub probe: Arc<dyn ReadinessProbe>,
    pub store: Arc<dyn ContainerRecordStore>,
    /// Builds the model runtime once the orchestrator exists.
    pub runtime: Box<dyn FnOnce(Arc<ContainerOrchestrator>) -> Arc<dyn ModelRuntime> + Send>,
    pub remote: Option<Arc<dyn ModelSource>>,
    pub registry_source: Option<Arc<dyn ModelSource>>,
}

/// Fully wired control plane.
pub struct Components {
    pub config: Config,
    pub registry: Arc<ModelRegistry>,
    pub orchestrator: Arc<ContainerOrchestrator>,
    pub lifecycle: Arc<LifecycleManager>,
    pub sync: Arc<SyncHandler>,
    pub control: Arc<ControlPlane>,
    pub local: Arc<dyn ModelSource>,
    pub remote: Option<Arc<dyn ModelSource>>,
    /// Container registry project, when configured.
    pub registry_source: Option<Arc<dyn ModelSource>>,
    /// Present when a remote repository is configured.
    pub webhook: Option<Arc<WebhookReconciler>>,
}

/// Production container orchestrator: docker CLI, HTTP probe, JSON registry.
#[must_use]
pub fn build_orchestrator(config: &Config) -> Arc<ContainerOrchestrator> {
    let (engine, probe, store) = production_ports(config);
    Arc::new(ContainerOrchestrator::new(
        config.containers.to_orchestrator_config(),
        engine,
        probe,
        store,
    ))
}

/// Docker CLI engine from the container settings.
#[must_use]
pub fn production_engine(config: &Config) -> Arc<dyn ContainerEngine> {
    Arc::new(DockerCli::new(config.containers.docker_bin.clone()))
}

fn production_ports(
    config: &Config,
) -> (
    Arc<dyn ContainerEngine>,
    Arc<dyn ReadinessProbe>,
    Arc<dyn ContainerRecordStore>,
) {
    (
        production_engine(config),
        Arc::new(TfServingProbe::new(PROBE_TIMEOUT)),
        Arc::new(JsonRecordStore::new(config.state_file.clone())),
    )
}

/// Remote repository source, when one is configured.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_remote_source(config: &Config) -> Result<Option<Arc<dyn ModelSource>>> {
    let Some(github) = &config.github else {
        return Ok(None);
    };
    let source = GitHubSource::new(github.to_source_config(&config.models_dir))?;
    info!(
        repo = %github.repo,
        branch = %github.branch,
        authenticated = github.token.is_some(),
        "Remote model repository configured"
    );
    Ok(Some(Arc::new(source)))
}

/// Harbor registry source, when one is configured.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn build_registry_source(
    config: &Config,
    engine: Arc<dyn ContainerEngine>,
) -> Result<Option<Arc<dyn ModelSource>>> {
    let Some(harbor) = &config.harbor else {
        return Ok(None);
    };
    let source = HarborSource::new(harbor.to_source_config(&config.models_dir), engine)?;
    info!(
        url = %harbor.url,
        project = %harbor.project,
        authenticated = harbor.username.is_some(),
        "Model registry project configured"
    );
    Ok(Some(Arc::new(source)))
}

impl Components {
    /// Wire the production adapters.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter cannot be constructed.
    pub fn build(config: Config) -> Result<Self> {
        let (engine, probe, store) = production_ports(&config);
        let remote = build_remote_source(&config)?;
        let registry_source = build_registry_source(&config, Arc::clone(&engine))?;
        let adapters = Adapters {
            engine,
            probe,
            store,
            runtime: Box::new(|orchestrator: Arc<ContainerOrchestrator>| {
                Arc::new(ServingRuntime::new(orchestrator, PREDICT_TIMEOUT))
                    as Arc<dyn ModelRuntime>
            }),
            remote,
            registry_source,
        };
        Ok(Self::assemble(config, adapters))
    }

    /// Wire the application layer against explicit ports.
    #[must_use]
    pub fn assemble(config: Config, adapters: Adapters) -> Self {
        let orchestrator = Arc::new(ContainerOrchestrator::new(
            config.containers.to_orchestrator_config(),
            adapters.engine,
            adapters.probe,
            adapters.store,
        ));
        let runtime = (adapters.runtime)(Arc::clone(&orchestrator));
        let registry = Arc::new(ModelRegistry::new());
        let local: Arc<dyn ModelSource> =
            Arc::new(LocalDirectorySource::new(config.models_dir.clone()));

        let mut lifecycle = LifecycleManager::new(
            config.lifecycle_config(),
            Arc::clone(&registry),
            runtime,
            Arc::clone(&orchestrator),
        )
        .with_source(Arc::clone(&local));
        for source in adapters.remote.iter().chain(adapters.registry_source.iter()) {
            lifecycle = lifecycle.with_source(Arc::clone(source));
        }
        let lifecycle = Arc::new(lifecycle);

        let sync = Arc::new(SyncHandler::new(Arc::clone(&lifecycle)));
        let control = Arc::new(ControlPlane::new(
            Arc::clone(&lifecycle),
            config.predict_path_prefix.clone(),
            config.activation_timeout(),
        ));
        let webhook = adapters.remote.as_ref().map(|remote| {
            Arc::new(WebhookReconciler::new(
                Arc::clone(remote),
                Arc::clone(&sync),
                config.webhook.branch_filter(),
            ))
        });

        Self {
            config,
            registry,
            orchestrator,
            lifecycle,
            sync,
            control,
            local,
            remote: adapters.remote,
            registry_source: adapters.registry_source,
            webhook,
        }
    }

    /// Configured remote sources, repository before registry.
    #[must_use]
    pub fn remote_sources(&self) -> Vec<Arc<dyn ModelSource>> {
        self.remote
            .iter()
            .chain(self.registry_source.iter())
            .cloned()
            .collect()
    }

    /// Polling watcher over the models directory.
    #[must_use]
    pub fn watcher(&self) -> FilesystemWatcher {
        FilesystemWatcher::new(
            self.config.watcher.to_watcher_config(&self.config.models_dir),
            Arc::clone(&self.sync),
        )
    }
}
