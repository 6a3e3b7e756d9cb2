//! Source-agnostic discovery mediator.
//!
//! Every discovery source (directory watcher, repository webhook, remote
//! listing) funnels its events through [`SyncHandler`]. Discovery only ever
//! makes a model *available*; activation stays an explicit call.

use std::sync::Arc;

use tracing::{debug, info};

use super::lifecycle::{Deactivation, LifecycleManager};
use super::registry::ModelRegistry;
use crate::domain::{ModelDescriptor, ModelName, SyncBatch, TeardownReport};

/// What applying a [`SyncBatch`] did.
#[derive(Debug, Clone, Default)]
pub struct SyncOutcome {
    /// One teardown report per removed model, in batch order.
    pub removed: Vec<TeardownReport>,
    pub added: Vec<ModelName>,
    pub modified: Vec<ModelName>,
    /// Modified models that were active and got force-deactivated.
    pub deactivated: Vec<ModelName>,
}

impl SyncOutcome {
    /// Whether every removal tore down cleanly.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.removed.iter().all(TeardownReport::is_clean)
    }
}

/// Translates add/remove/modify events into registry and lifecycle actions.
pub struct SyncHandler {
    registry: Arc<ModelRegistry>,
    lifecycle: Arc<LifecycleManager>,
}

impl SyncHandler {
    pub fn new(lifecycle: Arc<LifecycleManager>) -> Self {
        Self {
            registry: Arc::clone(lifecycle.registry()),
            lifecycle,
        }
    }

    #[must_use]
    pub fn lifecycle(&self) -> &Arc<LifecycleManager> {
        &self.lifecycle
    }

    /// Make a newly discovered model available. Never activates it.
    pub fn added(&self, descriptor: ModelDescriptor) {
        debug!(model = %descriptor.name, source = %descriptor.source, "Model discovered");
        self.registry.register(descriptor);
    }

    /// Tear a vanished model down completely.
    pub async fn removed(&self, name: &str) -> TeardownReport {
        debug!(model = %name, "Model vanished");
        self.lifecycle.remove_completely(name).await
    }

    /// Replace a model's descriptor, deactivating it if it was serving.
    ///
    /// Returns whether an active instance was deactivated. Re-activation is
    /// left to the caller.
    pub async fn modified(&self, descriptor: ModelDescriptor) -> bool {
        let name = descriptor.name.clone();
        self.registry.register(descriptor);
        match self.lifecycle.deactivate(name.as_str()).await {
            Deactivation::Deactivated { .. } => {
                info!(model = %name, "Model changed while active, deactivated");
                true
            }
            Deactivation::NotActive => false,
        }
    }

    /// Apply a batch: every removal first, then additions, then modifications.
    pub async fn apply_batch(&self, batch: SyncBatch) -> SyncOutcome {
        let mut outcome = SyncOutcome::default();
        if batch.is_empty() {
            return outcome;
        }

        for name in &batch.removed {
            outcome.removed.push(self.removed(name.as_str()).await);
        }
        for descriptor in batch.added {
            outcome.added.push(descriptor.name.clone());
            self.added(descriptor);
        }
        for descriptor in batch.modified {
            let name = descriptor.name.clone();
            if self.modified(descriptor).await {
                outcome.deactivated.push(name.clone());
            }
            outcome.modified.push(name);
        }

        info!(
            removed = outcome.removed.len(),
            added = outcome.added.len(),
            modified = outcome.modified.len(),
            "Applied discovery batch"
        );
        outcome
    }
}
