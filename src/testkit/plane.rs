//! A fully wired control plane over in-memory adapters.
//!
//! ```ignore
//! let dir = tempfile::tempdir()?;
//! let plane = TestPlane::builder(dir.path()).with_remote().build()?;
//! plane.components.sync.added(testkit::domain::local(plane.models_dir(), "fire"));
//! ```

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use super::config;
use super::engine::FakeEngine;
use super::probe::ScriptedProbe;
use super::runtime::FakeRuntime;
use super::source::StaticSource;
use super::store::MemoryRecordStore;
use crate::adapter::outbound::runtime::ServingRuntime;
use crate::domain::SourceKind;
use crate::application::container::ContainerOrchestrator;
use crate::error::Result;
use crate::infrastructure::bootstrap::{Adapters, Components};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::runtime::ModelRuntime;
use crate::port::outbound::source::ModelSource;

pub struct TestPlane {
    pub components: Components,
    pub engine: Arc<FakeEngine>,
    pub probe: Arc<ScriptedProbe>,
    pub store: Arc<MemoryRecordStore>,
    /// The in-process runtime; unused when built with `serving_runtime`.
    pub runtime: Arc<FakeRuntime>,
    pub remote: Option<Arc<StaticSource>>,
    pub registry_source: Option<Arc<StaticSource>>,
}

impl TestPlane {
    /// Start building a plane rooted at `dir`.
    pub fn builder(dir: &Path) -> TestPlaneBuilder {
        TestPlaneBuilder {
            config: config::control_plane(dir),
            engine: FakeEngine::new(),
            probe: ScriptedProbe::ready(),
            store: MemoryRecordStore::new(),
            remote: false,
            registry_source: false,
            serving: false,
        }
    }

    pub fn models_dir(&self) -> &Path {
        &self.components.config.models_dir
    }
}

pub struct TestPlaneBuilder {
    config: Config,
    engine: FakeEngine,
    probe: ScriptedProbe,
    store: MemoryRecordStore,
    remote: bool,
    registry_source: bool,
    serving: bool,
}

impl TestPlaneBuilder {
    pub fn configure(mut self, apply: impl FnOnce(&mut Config)) -> Self {
        apply(&mut self.config);
        self
    }

    pub fn engine(mut self, engine: FakeEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn probe(mut self, probe: ScriptedProbe) -> Self {
        self.probe = probe;
        self
    }

    pub fn store(mut self, store: MemoryRecordStore) -> Self {
        self.store = store;
        self
    }

    /// Attach a [`StaticSource`] as the remote repository.
    pub fn with_remote(mut self) -> Self {
        self.remote = true;
        self
    }

    /// Attach a [`StaticSource`] as the container registry project.
    pub fn with_registry_source(mut self) -> Self {
        self.registry_source = true;
        self
    }

    /// Serve models from containers instead of the in-process runtime.
    pub fn serving_runtime(mut self) -> Self {
        self.serving = true;
        self
    }

    /// Create the models directory and wire every component.
    pub fn build(self) -> Result<TestPlane> {
        std::fs::create_dir_all(&self.config.models_dir)?;

        let engine = Arc::new(self.engine);
        let probe = Arc::new(self.probe);
        let store = Arc::new(self.store);
        let runtime = Arc::new(FakeRuntime::new());
        let remote = self
            .remote
            .then(|| Arc::new(StaticSource::new(self.config.models_dir.clone())));
        let registry_source = self.registry_source.then(|| {
            Arc::new(StaticSource::of_kind(
                SourceKind::RegistrySource,
                self.config.models_dir.clone(),
            ))
        });

        let in_process = Arc::clone(&runtime);
        let serving = self.serving;
        let adapters = Adapters {
            engine: engine.clone(),
            probe: probe.clone(),
            store: store.clone(),
            runtime: Box::new(move |orchestrator: Arc<ContainerOrchestrator>| {
                if serving {
                    Arc::new(ServingRuntime::new(orchestrator, Duration::from_secs(1)))
                        as Arc<dyn ModelRuntime>
                } else {
                    in_process as Arc<dyn ModelRuntime>
                }
            }),
            remote: remote
                .clone()
                .map(|source| source as Arc<dyn ModelSource>),
            registry_source: registry_source
                .clone()
                .map(|source| source as Arc<dyn ModelSource>),
        };

        Ok(TestPlane {
            components: Components::assemble(self.config, adapters),
            engine,
            probe,
            store,
            runtime,
            remote,
            registry_source,
        })
    }
}
