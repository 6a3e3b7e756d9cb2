//! Polling filesystem watcher.
//!
//! Polls the models directory on a fixed interval instead of relying on OS
//! notifications, which are unreliable on virtualized and network mounts.
//!
//! ```text
//! tick --> capture snapshot --> diff(previous) --> SyncBatch --> SyncHandler
//!                                     |
//!                                     +-- previous := snapshot
//! ```
//!
//! The first poll diffs against an empty snapshot, so artifacts already on
//! disk at startup are registered as available.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::snapshot::{DirectorySnapshot, SnapshotDiff};
use crate::application::sync::{SyncHandler, SyncOutcome};
use crate::domain::{ModelDescriptor, ModelEvent, SyncBatch};
use crate::error::{Error, Result};

/// Configuration for the filesystem watcher.
#[derive(Debug, Clone)]
pub struct WatcherConfig {
    /// Directory to watch.
    pub dir: PathBuf,
    /// Delay between polls.
    pub poll_interval: Duration,
}

/// Handle for controlling the watcher's background task.
pub struct WatcherHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl WatcherHandle {
    /// Signal the watcher to stop and wait for its task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "Watcher task ended abnormally");
        }
    }
}

/// Turn a snapshot diff into model-level events.
#[must_use]
pub fn batch_from_diff(diff: SnapshotDiff) -> SyncBatch {
    let removed = diff
        .removed
        .into_iter()
        .map(|entry| ModelEvent::Removed(entry.model));
    let added = diff
        .added
        .into_iter()
        .map(|entry| ModelEvent::Added(ModelDescriptor::local(entry.model, &entry.path)));
    removed.chain(added).collect()
}

/// Background reconciler for a local models directory.
pub struct FilesystemWatcher {
    config: WatcherConfig,
    sync: Arc<SyncHandler>,
    previous: Mutex<DirectorySnapshot>,
}

impl FilesystemWatcher {
    pub fn new(config: WatcherConfig, sync: Arc<SyncHandler>) -> Self {
        Self {
            config,
            sync,
            previous: Mutex::new(DirectorySnapshot::empty()),
        }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.config.dir
    }

    /// Run one poll cycle and apply whatever changed.
    ///
    /// An unreadable directory skips the cycle and keeps the previous
    /// snapshot, so a transient mount hiccup never looks like mass removal.
    pub async fn poll_once(&self) -> Result<SyncOutcome> {
        let mut previous = self.previous.lock().await;
        let current = capture(&self.config.dir).await?;
        let diff = previous.diff(&current);
        *previous = current;
        drop(previous);

        if diff.is_empty() {
            return Ok(SyncOutcome::default());
        }
        let batch = batch_from_diff(diff);
        debug!(events = batch.len(), "Directory changed");
        Ok(self.sync.apply_batch(batch).await)
    }

    /// Spawn the polling loop. The first tick is deferred by one interval;
    /// call [`poll_once`](Self::poll_once) beforehand for an immediate scan.
    pub fn start(self) -> WatcherHandle {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let watcher = Arc::new(self);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(watcher.config.poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;

            info!(
                dir = %watcher.config.dir.display(),
                interval_ms = watcher.config.poll_interval.as_millis() as u64,
                "Filesystem watcher started"
            );

            loop {
                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        info!("Filesystem watcher shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        if let Err(e) = watcher.poll_once().await {
                            warn!(error = %e, "Watcher poll failed, keeping previous snapshot");
                        }
                    }
                }
            }
        });

        WatcherHandle { shutdown_tx, task }
    }
}

async fn capture(dir: &Path) -> Result<DirectorySnapshot> {
    let owned = dir.to_path_buf();
    tokio::task::spawn_blocking(move || DirectorySnapshot::capture(&owned))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))?
        .map_err(Error::from)
}
