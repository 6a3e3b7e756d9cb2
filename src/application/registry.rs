//! Thread-safe model registry.
//!
//! Separates *available* models (known to some source) from *active* models
//! (loaded and serving). Every operation takes the single registry lock for
//! one map access and releases it before logging or returning; no I/O ever
//! happens while the lock is held.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::domain::{ActiveModel, ModelDescriptor, ModelName};
use crate::error::{ModelError, Result};

/// Outcome of committing an active model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationCommit {
    /// The model was inserted into the active set.
    Inserted,
    /// The model was already active; the existing entry was kept.
    AlreadyActive,
}

#[derive(Default)]
struct RegistryState {
    available: HashMap<ModelName, ModelDescriptor>,
    active: HashMap<ModelName, ActiveModel>,
}

/// Registry of available and active models.
#[derive(Default)]
pub struct ModelRegistry {
    state: Mutex<RegistryState>,
}

impl ModelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // === Available models ===

    /// Register (or replace) an available model.
    pub fn register(&self, descriptor: ModelDescriptor) {
        let name = descriptor.name.clone();
        let replaced = self
            .state
            .lock()
            .available
            .insert(name.clone(), descriptor)
            .is_some();
        info!(model = %name, replaced, "Registered model");
    }

    /// Remove an available model, returning its descriptor if it existed.
    ///
    /// An active entry for the same name is dropped too so the active set
    /// never outlives availability. Callers that own backing resources
    /// deactivate first.
    pub fn unregister(&self, name: &str) -> Option<ModelDescriptor> {
        let (descriptor, orphan) = {
            let mut state = self.state.lock();
            (state.available.remove(name), state.active.remove(name))
        };
        if orphan.is_some() {
            warn!(model = %name, "Unregistered model that was still active");
        }
        if descriptor.is_some() {
            info!(model = %name, "Unregistered model");
        }
        descriptor
    }

    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<ModelDescriptor> {
        self.state.lock().available.get(name).cloned()
    }

    #[must_use]
    pub fn is_available(&self, name: &str) -> bool {
        self.state.lock().available.contains_key(name)
    }

    /// Copy of every available model, keyed by name.
    #[must_use]
    pub fn available_models(&self) -> BTreeMap<ModelName, ModelDescriptor> {
        let state = self.state.lock();
        state
            .available
            .iter()
            .map(|(name, descriptor)| (name.clone(), descriptor.clone()))
            .collect()
    }

    // === Active models ===

    /// Commit a loaded model into the active set.
    ///
    /// Fails with `NotFound` if the model is not available; keeps the
    /// existing entry if it is already active.
    pub fn activate(&self, model: ActiveModel) -> Result<ActivationCommit> {
        let name = model.name().clone();
        let commit = {
            let mut state = self.state.lock();
            if !state.available.contains_key(&name) {
                None
            } else if state.active.contains_key(&name) {
                Some(ActivationCommit::AlreadyActive)
            } else {
                state.active.insert(name.clone(), model);
                Some(ActivationCommit::Inserted)
            }
        };

        match commit {
            None => {
                warn!(model = %name, "Cannot activate model: not available");
                Err(ModelError::NotFound {
                    name: name.to_string(),
                }
                .into())
            }
            Some(commit) => {
                if commit == ActivationCommit::Inserted {
                    info!(model = %name, "Activated model");
                }
                Ok(commit)
            }
        }
    }

    /// Remove a model from the active set, returning the entry if it was active.
    pub fn deactivate(&self, name: &str) -> Option<ActiveModel> {
        let removed = self.state.lock().active.remove(name);
        if removed.is_some() {
            info!(model = %name, "Deactivated model");
        }
        removed
    }

    #[must_use]
    pub fn active(&self, name: &str) -> Option<ActiveModel> {
        self.state.lock().active.get(name).cloned()
    }

    #[must_use]
    pub fn is_active(&self, name: &str) -> bool {
        self.state.lock().active.contains_key(name)
    }

    /// Copy of every active model, keyed by name.
    #[must_use]
    pub fn active_models(&self) -> BTreeMap<ModelName, ActiveModel> {
        let state = self.state.lock();
        state
            .active
            .iter()
            .map(|(name, model)| (name.clone(), model.clone()))
            .collect()
    }

    // === Utility ===

    /// Names of all available models, active or not.
    #[must_use]
    pub fn names(&self) -> BTreeSet<ModelName> {
        self.state.lock().available.keys().cloned().collect()
    }

    /// Drop every model, for full reinitialization.
    pub fn clear_all(&self) {
        {
            let mut state = self.state.lock();
            state.available.clear();
            state.active.clear();
        }
        info!("Cleared all models");
    }
}
