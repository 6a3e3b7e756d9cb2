//! Diagnostic projections for operator-facing adapters.

use crate::error::Result;

/// Summary output for `check config`.
#[derive(Debug, Clone)]
pub struct ConfigCheckReport {
    pub models_dir: String,
    pub state_file: String,
    pub profile: String,
    pub serving_image: String,
    pub remote_repo: Option<String>,
    pub github_token_present: bool,
    pub watcher_enabled: bool,
    pub webhook_branch: Option<String>,
}

/// One readiness check as shown to the operator.
#[derive(Debug, Clone)]
pub struct HealthCheckEntry {
    pub name: String,
    /// Critical checks decide the overall verdict.
    pub critical: bool,
    /// Why the check failed; `None` when it passed.
    pub failure: Option<String>,
}

impl HealthCheckEntry {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.failure.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct HealthCheckReport {
    pub checks: Vec<HealthCheckEntry>,
}

impl HealthCheckReport {
    /// A failing non-critical check never makes the report unhealthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        !self
            .checks
            .iter()
            .any(|check| check.critical && !check.is_healthy())
    }
}

/// Diagnostics use-cases for operator-facing adapters.
pub trait DiagnosticOperator: Send + Sync {
    /// Parse and validate `config_toml` into the `check config` summary.
    fn check_config(&self, config_toml: &str) -> Result<ConfigCheckReport>;

    /// Readiness of the directories, addressing and remote source that
    /// `config_toml` describes.
    fn health_report(&self, config_toml: &str) -> Result<HealthCheckReport>;
}
