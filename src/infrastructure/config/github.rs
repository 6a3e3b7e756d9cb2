//! GitHub model repository settings.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::adapter::outbound::github::GitHubSourceConfig;

/// Optional remote repository holding one model per top-level entry.
///
/// The access token is read from `GITHUB_TOKEN`, never from the file.
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubSettings {
    /// Repository as `owner/name`.
    pub repo: String,

    /// Branch to list and download from. Defaults to `main`.
    #[serde(default = "default_branch")]
    pub branch: String,

    /// API base URL. Defaults to `https://api.github.com`.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Per-request timeout in milliseconds. Defaults to 15000ms.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(skip)]
    pub token: Option<String>,
}

fn default_branch() -> String {
    "main".into()
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

const fn default_timeout_ms() -> u64 {
    15_000
}

impl GitHubSettings {
    /// Whether `repo` has the `owner/name` shape.
    #[must_use]
    pub fn repo_is_well_formed(&self) -> bool {
        let mut parts = self.repo.split('/');
        matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some(owner), Some(name), None) if !owner.trim().is_empty() && !name.trim().is_empty()
        )
    }

    #[must_use]
    pub fn to_source_config(&self, models_dir: &Path) -> GitHubSourceConfig {
        GitHubSourceConfig {
            repo: self.repo.clone(),
            branch: self.branch.clone(),
            api_url: self.api_url.clone(),
            token: self.token.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            models_dir: models_dir.to_path_buf(),
        }
    }
}

/// Push webhook handling.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSettings {
    /// Only pushes whose `ref` equals this are applied.
    ///
    /// Defaults to `refs/heads/main`; an empty string applies every push.
    #[serde(default = "default_branch_filter")]
    pub branch_filter: String,
}

fn default_branch_filter() -> String {
    "refs/heads/main".into()
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            branch_filter: default_branch_filter(),
        }
    }
}

impl WebhookSettings {
    #[must_use]
    pub fn branch_filter(&self) -> Option<String> {
        let filter = self.branch_filter.trim();
        (!filter.is_empty()).then(|| filter.to_string())
    }
}
