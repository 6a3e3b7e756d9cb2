//! Directory watcher and artifact stabilization settings.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::application::watcher::{StabilizationConfig, WatcherConfig};

/// Polling watcher over the models directory.
#[derive(Debug, Clone, Deserialize)]
pub struct WatcherSettings {
    /// Run the watcher in the background. Defaults to true.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Delay between directory polls in milliseconds. Defaults to 1000ms.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

const fn default_enabled() -> bool {
    true
}

const fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for WatcherSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl WatcherSettings {
    #[must_use]
    pub fn to_watcher_config(&self, dir: &Path) -> WatcherConfig {
        WatcherConfig {
            dir: dir.to_path_buf(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }
}

/// Size-stability guard applied before loading a local artifact.
///
/// Independent of the watcher poll interval.
#[derive(Debug, Clone, Deserialize)]
pub struct StabilizationSettings {
    /// Delay between size measurements. Defaults to 500ms.
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// How long the size must stay unchanged. Defaults to 2000ms.
    #[serde(default = "default_stable_window_ms")]
    pub stable_window_ms: u64,

    /// Give up after this long. Defaults to 60000ms.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

const fn default_check_interval_ms() -> u64 {
    500
}

const fn default_stable_window_ms() -> u64 {
    2000
}

const fn default_timeout_ms() -> u64 {
    60_000
}

impl Default for StabilizationSettings {
    fn default() -> Self {
        Self {
            check_interval_ms: default_check_interval_ms(),
            stable_window_ms: default_stable_window_ms(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl StabilizationSettings {
    #[must_use]
    pub fn to_stabilization_config(&self) -> StabilizationConfig {
        StabilizationConfig {
            check_interval: Duration::from_millis(self.check_interval_ms),
            stable_window: Duration::from_millis(self.stable_window_ms),
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}
