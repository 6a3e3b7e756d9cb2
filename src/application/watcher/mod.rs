//! Polling filesystem watcher and its stabilization guard.

pub mod service;
pub mod snapshot;
pub mod stability;

pub use service::{FilesystemWatcher, WatcherConfig, WatcherHandle};
pub use snapshot::{DirectorySnapshot, SnapshotDiff};
pub use stability::StabilizationConfig;
