//! Repository push reconciliation.
//!
//! A push event lists the file paths each commit touched. Those are unioned
//! across commits, reduced to model names, and only the changed names are
//! looked up again at the source; the full catalog is never re-listed.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use super::sync::SyncHandler;
use crate::domain::{FileChanges, ModelName, SyncBatch, TeardownReport};
use crate::error::Result;
use crate::port::outbound::source::ModelSource;

/// Push event payload, reduced to the fields reconciliation needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushEvent {
    #[serde(rename = "ref", default)]
    pub git_ref: String,
    #[serde(default)]
    pub commits: Vec<PushCommit>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PushCommit {
    #[serde(default)]
    pub added: Vec<String>,
    #[serde(default)]
    pub removed: Vec<String>,
    #[serde(default)]
    pub modified: Vec<String>,
}

impl PushEvent {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Union of touched paths across every commit.
    #[must_use]
    pub fn file_changes(&self) -> FileChanges {
        let mut changes = FileChanges::default();
        for commit in &self.commits {
            changes.added.extend(commit.added.iter().cloned());
            changes.removed.extend(commit.removed.iter().cloned());
            changes.modified.extend(commit.modified.iter().cloned());
        }
        changes
    }
}

/// What a push did to the registry.
#[derive(Debug, Clone, Default)]
pub struct ReconcileReport {
    /// The push targeted a branch other than the filter.
    pub ignored: bool,
    pub removed: Vec<TeardownReport>,
    pub added: Vec<ModelName>,
    pub modified: Vec<ModelName>,
    /// Changed names the source no longer lists.
    pub missing: Vec<ModelName>,
    /// Names whose lookup failed, with the reason.
    pub failed: Vec<(ModelName, String)>,
}

/// Feeds push events from a remote repository into the sync handler.
pub struct WebhookReconciler {
    source: Arc<dyn ModelSource>,
    sync: Arc<SyncHandler>,
    branch_filter: Option<String>,
}

impl WebhookReconciler {
    pub fn new(
        source: Arc<dyn ModelSource>,
        sync: Arc<SyncHandler>,
        branch_filter: Option<String>,
    ) -> Self {
        Self {
            source,
            sync,
            branch_filter,
        }
    }

    /// Parse and handle a raw JSON payload.
    pub async fn handle_payload(&self, body: &[u8]) -> Result<ReconcileReport> {
        let event = PushEvent::from_slice(body)?;
        Ok(self.handle(&event).await)
    }

    /// Apply a push: removals first, then re-fetched additions and
    /// modifications.
    pub async fn handle(&self, event: &PushEvent) -> ReconcileReport {
        let mut report = ReconcileReport::default();

        if let Some(branch) = &self.branch_filter {
            if event.git_ref != *branch {
                debug!(git_ref = %event.git_ref, expected = %branch, "Ignoring push to other branch");
                report.ignored = true;
                return report;
            }
        }

        let changes = event.file_changes().to_model_changes();
        if changes.is_empty() {
            debug!("Push touched no models");
            return report;
        }

        let removals = SyncBatch {
            removed: changes.removed.iter().cloned().collect(),
            ..SyncBatch::default()
        };
        report.removed = self.sync.apply_batch(removals).await.removed;

        let mut updates = SyncBatch::default();
        for name in changes.pending_updates() {
            match self.source.lookup(&name).await {
                Ok(Some(descriptor)) if changes.modified.contains(&name) => {
                    updates.modified.push(descriptor);
                }
                Ok(Some(descriptor)) => updates.added.push(descriptor),
                Ok(None) => {
                    warn!(model = %name, "Changed model not found at source");
                    report.missing.push(name);
                }
                Err(e) => {
                    warn!(model = %name, error = %e, "Failed to look up changed model");
                    report.failed.push((name, e.to_string()));
                }
            }
        }

        let outcome = self.sync.apply_batch(updates).await;
        report.added = outcome.added;
        report.modified = outcome.modified;

        info!(
            removed = report.removed.len(),
            added = report.added.len(),
            modified = report.modified.len(),
            missing = report.missing.len(),
            "Reconciled push event"
        );
        report
    }
}
