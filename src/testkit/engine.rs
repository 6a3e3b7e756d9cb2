//! In-memory container engine.
//!
//! Containers started through [`FakeEngine`] are `running` immediately and
//! carry the labels of their spec, so label queries behave like the real
//! engine. Failures can be injected per operation.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{ContainerState, ContainerSummary};
use crate::error::{ContainerError, Result};
use crate::port::outbound::engine::{ContainerEngine, ContainerSpec, MODEL_NAME_LABEL};

struct FakeContainer {
    summary: ContainerSummary,
    labels: BTreeMap<String, String>,
}

#[derive(Default)]
pub struct FakeEngine {
    containers: Mutex<Vec<FakeContainer>>,
    specs: Mutex<Vec<ContainerSpec>>,
    next_id: AtomicUsize,
    run_failure: Mutex<Option<String>>,
    stuck: Mutex<BTreeSet<String>>,
    list_failure: Mutex<Option<String>>,
    copies: Mutex<Vec<(String, String, PathBuf)>>,
    missing_images: Mutex<BTreeSet<String>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a container that already exists, labelled `key=value`.
    pub fn insert(&self, summary: ContainerSummary, key: &str, value: &str) {
        let mut labels = BTreeMap::new();
        labels.insert(key.to_string(), value.to_string());
        if let Some(model) = &summary.model_name {
            labels.insert(MODEL_NAME_LABEL.to_string(), model.clone());
        }
        self.containers.lock().push(FakeContainer { summary, labels });
    }

    /// Change the state of an existing container.
    pub fn set_state(&self, reference: &str, state: ContainerState) {
        for container in self.containers.lock().iter_mut() {
            if container.summary.matches(reference) {
                container.summary.state = state;
            }
        }
    }

    /// Make every subsequent `run` fail with `reason`.
    pub fn fail_runs(&self, reason: &str) {
        *self.run_failure.lock() = Some(reason.to_string());
    }

    /// Make removal of the container named `name` fail.
    pub fn fail_removal(&self, name: &str) {
        self.stuck.lock().insert(name.to_string());
    }

    /// Make label queries fail with `reason`.
    pub fn fail_listing(&self, reason: &str) {
        *self.list_failure.lock() = Some(reason.to_string());
    }

    /// Make copies out of `image` fail as if it could not be pulled.
    pub fn missing_image(&self, image: &str) {
        self.missing_images.lock().insert(image.to_string());
    }

    /// `(image, source, target)` of every copy out of an image, in order.
    pub fn copies(&self) -> Vec<(String, String, PathBuf)> {
        self.copies.lock().clone()
    }

    /// Specs of every `run` call, in order.
    pub fn specs(&self) -> Vec<ContainerSpec> {
        self.specs.lock().clone()
    }

    pub fn run_count(&self) -> usize {
        self.specs.lock().len()
    }

    /// Names of the containers that currently exist.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .containers
            .lock()
            .iter()
            .map(|c| c.summary.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn exists(&self, reference: &str) -> bool {
        self.containers
            .lock()
            .iter()
            .any(|c| c.summary.matches(reference))
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    async fn inspect(&self, reference: &str) -> Result<Option<ContainerSummary>> {
        Ok(self
            .containers
            .lock()
            .iter()
            .find(|c| c.summary.matches(reference))
            .map(|c| c.summary.clone()))
    }

    async fn run(&self, spec: &ContainerSpec) -> Result<String> {
        self.specs.lock().push(spec.clone());
        if let Some(reason) = self.run_failure.lock().clone() {
            return Err(ContainerError::Engine(reason).into());
        }

        let mut containers = self.containers.lock();
        if containers.iter().any(|c| c.summary.name == spec.name) {
            return Err(ContainerError::Engine(format!(
                "container name {} already in use",
                spec.name
            ))
            .into());
        }

        let id = format!("{:012x}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        containers.push(FakeContainer {
            summary: ContainerSummary {
                id: id.clone(),
                name: spec.name.clone(),
                state: ContainerState::Running,
                model_name: spec.labels.get(MODEL_NAME_LABEL).cloned(),
            },
            labels: spec.labels.clone(),
        });
        Ok(id)
    }

    async fn remove_force(&self, reference: &str) -> Result<bool> {
        let mut containers = self.containers.lock();
        let Some(index) = containers
            .iter()
            .position(|c| c.summary.matches(reference))
        else {
            return Ok(false);
        };
        if self.stuck.lock().contains(&containers[index].summary.name) {
            return Err(ContainerError::Engine(format!(
                "removal of {} is already in progress",
                containers[index].summary.name
            ))
            .into());
        }
        containers.remove(index);
        Ok(true)
    }

    async fn list_by_label(&self, key: &str, value: &str) -> Result<Vec<ContainerSummary>> {
        if let Some(reason) = self.list_failure.lock().clone() {
            return Err(ContainerError::Engine(reason).into());
        }
        Ok(self
            .containers
            .lock()
            .iter()
            .filter(|c| c.labels.get(key).is_some_and(|v| v == value))
            .map(|c| c.summary.clone())
            .collect())
    }

    /// Every image holds a minimal SavedModel at any source path.
    async fn copy_from_image(&self, image: &str, source: &str, target: &Path) -> Result<()> {
        self.copies
            .lock()
            .push((image.to_string(), source.to_string(), target.to_path_buf()));
        if self.missing_images.lock().contains(image) {
            return Err(ContainerError::Engine(format!("pull access denied for {image}")).into());
        }
        std::fs::create_dir_all(target.join("1/variables"))?;
        std::fs::write(target.join("1/saved_model.pb"), b"graph")?;
        Ok(())
    }
}
