//! Runtime control projection types for operator-facing adapters.
//!
//! Defines request and response types for starting the control plane in the
//! foreground.

use async_trait::async_trait;

use crate::error::Result;

/// Runtime configuration overrides from CLI flags.
///
/// Overrides take precedence over the configuration file.
#[derive(Debug, Clone, Default)]
pub struct RunRequest {
    /// Raw TOML configuration content.
    pub config_toml: String,

    /// Models to activate once startup discovery has finished.
    pub activate: Vec<String>,

    /// Override for the models directory.
    pub models_dir: Option<String>,

    /// Override for log level (e.g., "debug", "info", "warn").
    pub log_level: Option<String>,

    /// Whether to output logs as JSON.
    pub json_logs: bool,

    /// Disable the background directory watcher.
    pub no_watch: bool,
}

/// Startup information snapshot for display.
#[derive(Debug, Clone)]
pub struct RunStartupSnapshot {
    pub models_dir: String,
    /// Deployment profile label (`host` or `overlay`).
    pub profile: String,
    /// Human-readable container addressing summary.
    pub addressing: String,
    pub serving_image: String,
    /// `owner/name@branch` when a remote repository is configured.
    pub remote_repo: Option<String>,
    pub watcher_enabled: bool,
    pub activate: Vec<String>,
}

/// Runtime control use-cases for operator-facing adapters.
///
/// # Thread Safety
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait RuntimeOperator: Send + Sync {
    /// Prepare a startup snapshot from runtime overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    fn prepare_run(&self, request: &RunRequest) -> Result<RunStartupSnapshot>;

    /// Run the control plane until Ctrl+C, then sweep owned containers.
    ///
    /// # Errors
    ///
    /// Returns an error if runtime initialization or execution fails.
    async fn execute_run(&self, request: RunRequest) -> Result<()>;
}
