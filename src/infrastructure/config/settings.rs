//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all control-plane
//! settings. Configuration is loaded from a TOML file; secrets
//! (`GITHUB_TOKEN`, `HARBOR_USERNAME`, `HARBOR_PASSWORD`) come from the
//! environment.
//!
//! # Example
//!
//! ```no_run
//! use modelplane::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("modelplane.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::containers::ContainerSettings;
use super::github::{GitHubSettings, WebhookSettings};
use super::harbor::HarborSettings;
use super::logging::LoggingConfig;
use super::watcher::{StabilizationSettings, WatcherSettings};
use crate::application::lifecycle::LifecycleConfig;
use crate::error::{ConfigError, Result};

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every field has a default, so an empty file is a
/// valid configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Directory holding local model artifacts. Defaults to `/models`.
    #[serde(default = "default_models_dir")]
    pub models_dir: PathBuf,

    /// Persisted container registry document.
    ///
    /// Defaults to `.modelplane/containers.json`.
    #[serde(default = "default_state_file")]
    pub state_file: PathBuf,

    /// Request-layer prefix that prediction endpoints are reported under.
    /// Defaults to `/predict`.
    #[serde(default = "default_predict_path_prefix")]
    pub predict_path_prefix: String,

    /// Upper bound on one explicit activation. Defaults to 120 seconds.
    #[serde(default = "default_activation_timeout_secs")]
    pub activation_timeout_secs: u64,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub watcher: WatcherSettings,

    #[serde(default)]
    pub stabilization: StabilizationSettings,

    /// Serving container orchestration.
    #[serde(default)]
    pub containers: ContainerSettings,

    /// Remote model repository. Disabled when absent.
    #[serde(default)]
    pub github: Option<GitHubSettings>,

    /// Container registry project. Disabled when absent.
    #[serde(default)]
    pub harbor: Option<HarborSettings>,

    #[serde(default)]
    pub webhook: WebhookSettings,
}

fn default_models_dir() -> PathBuf {
    PathBuf::from("/models")
}

fn default_state_file() -> PathBuf {
    PathBuf::from(".modelplane/containers.json")
}

fn default_predict_path_prefix() -> String {
    "/predict".into()
}

const fn default_activation_timeout_secs() -> u64 {
    120
}

impl Default for Config {
    fn default() -> Self {
        Self {
            models_dir: default_models_dir(),
            state_file: default_state_file(),
            predict_path_prefix: default_predict_path_prefix(),
            activation_timeout_secs: default_activation_timeout_secs(),
            logging: LoggingConfig::default(),
            watcher: WatcherSettings::default(),
            stabilization: StabilizationSettings::default(),
            containers: ContainerSettings::default(),
            github: None,
            harbor: None,
            webhook: WebhookSettings::default(),
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn invalid(field: &'static str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
    .into()
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// Loads the GitHub access token from `GITHUB_TOKEN` when a repository is
    /// configured, and registry credentials from `HARBOR_USERNAME` and
    /// `HARBOR_PASSWORD` when a Harbor project is.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML content is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Some(github) = config.github.as_mut() {
            github.token = non_empty_env("GITHUB_TOKEN");
        }
        if let Some(harbor) = config.harbor.as_mut() {
            harbor.username = non_empty_env("HARBOR_USERNAME");
            harbor.password = non_empty_env("HARBOR_PASSWORD");
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML content is
    /// malformed, or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.models_dir.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "models_dir" }.into());
        }
        if self.state_file.as_os_str().is_empty() {
            return Err(ConfigError::MissingField { field: "state_file" }.into());
        }
        if self.activation_timeout_secs == 0 {
            return Err(invalid("activation_timeout_secs", "must be greater than 0"));
        }

        if self.watcher.poll_interval_ms == 0 {
            return Err(invalid("poll_interval_ms", "must be greater than 0"));
        }

        let stabilization = &self.stabilization;
        if stabilization.check_interval_ms == 0
            || stabilization.stable_window_ms == 0
            || stabilization.timeout_ms == 0
        {
            return Err(invalid(
                "stabilization",
                "interval, window and timeout must be greater than 0",
            ));
        }

        let containers = &self.containers;
        if containers.image.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "image" }.into());
        }
        if containers.label_key.trim().is_empty() || containers.label_value.trim().is_empty() {
            return Err(invalid("label_key", "owner label key and value must be set"));
        }
        if containers.port_range_start == 0 {
            return Err(invalid("port_range_start", "must be greater than 0"));
        }
        if containers.port_range_len() == 0 {
            return Err(invalid(
                "port_range_end",
                "must be >= port_range_start",
            ));
        }
        if containers.rest_port == 0 || containers.grpc_port == 0 {
            return Err(invalid("rest_port", "container ports must be greater than 0"));
        }
        if containers.network.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "network" }.into());
        }
        if containers.readiness_interval_ms == 0 || containers.readiness_timeout_secs == 0 {
            return Err(invalid(
                "readiness_timeout_secs",
                "readiness interval and timeout must be greater than 0",
            ));
        }
        if containers.docker_bin.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "docker_bin" }.into());
        }

        if let Some(github) = &self.github {
            if !github.repo_is_well_formed() {
                return Err(invalid("repo", "must be of the form owner/name"));
            }
            if let Err(e) = url::Url::parse(&github.api_url) {
                return Err(invalid("api_url", &e.to_string()));
            }
            if github.timeout_ms == 0 {
                return Err(invalid("timeout_ms", "must be greater than 0"));
            }
        }

        if let Some(harbor) = &self.harbor {
            if let Err(e) = url::Url::parse(&harbor.url) {
                return Err(invalid("url", &e.to_string()));
            }
            if harbor.project.trim().is_empty() {
                return Err(ConfigError::MissingField { field: "project" }.into());
            }
            if harbor.timeout_ms == 0 || harbor.page_size == 0 {
                return Err(invalid("page_size", "timeout and page size must be greater than 0"));
            }
        }

        Ok(())
    }

    #[must_use]
    pub fn lifecycle_config(&self) -> LifecycleConfig {
        LifecycleConfig {
            models_dir: self.models_dir.clone(),
            stabilization: self.stabilization.to_stabilization_config(),
        }
    }

    #[must_use]
    pub fn activation_timeout(&self) -> Duration {
        Duration::from_secs(self.activation_timeout_secs)
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
