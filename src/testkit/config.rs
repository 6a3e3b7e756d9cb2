//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests. Timings are
//! short so stabilization and readiness loops finish in milliseconds.

use std::path::Path;
use std::time::Duration;

use crate::application::container::{Addressing, OrchestratorConfig};
use crate::application::watcher::StabilizationConfig;
use crate::infrastructure::config::profile::Profile;
use crate::infrastructure::config::settings::Config;

/// Stabilization guard that settles after a few quiet checks.
pub fn stabilization() -> StabilizationConfig {
    StabilizationConfig {
        check_interval: Duration::from_millis(10),
        stable_window: Duration::from_millis(30),
        timeout: Duration::from_secs(2),
    }
}

/// Orchestrator config on an overlay network, so no host ports are probed.
pub fn orchestrator() -> OrchestratorConfig {
    OrchestratorConfig {
        addressing: Addressing::Overlay {
            network: "modelplane-test".into(),
        },
        readiness_interval: Duration::from_millis(5),
        readiness_timeout: Duration::from_millis(100),
        ..OrchestratorConfig::default()
    }
}

/// Full configuration rooted at `dir`: models under `dir/models`, state under
/// `dir/state`.
pub fn control_plane(dir: &Path) -> Config {
    let mut config = Config::default();
    config.models_dir = dir.join("models");
    config.state_file = dir.join("state/containers.json");
    config.activation_timeout_secs = 5;
    config.watcher.poll_interval_ms = 20;
    config.stabilization.check_interval_ms = 10;
    config.stabilization.stable_window_ms = 30;
    config.stabilization.timeout_ms = 2_000;
    config.containers.profile = Profile::Overlay;
    config.containers.network = "modelplane-test".into();
    config.containers.readiness_interval_ms = 5;
    config.containers.readiness_timeout_secs = 1;
    config
}
