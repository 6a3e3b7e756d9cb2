//! Harbor registry source settings.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::adapter::outbound::harbor::HarborSourceConfig;

/// Optional Harbor project whose repositories are models.
///
/// Credentials are read from `HARBOR_USERNAME` and `HARBOR_PASSWORD`, never
/// from the file. Without a username requests are anonymous.
#[derive(Debug, Clone, Deserialize)]
pub struct HarborSettings {
    /// Registry base URL, e.g. `https://harbor.example.com`.
    pub url: String,

    pub project: String,

    /// Per-request timeout in milliseconds. Defaults to 15000ms.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Entries requested per page. Defaults to 100.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Directory inside each image that holds `<model>/`. Defaults to
    /// `/models`, where TensorFlow Serving images keep them.
    #[serde(default = "default_model_root")]
    pub model_root: String,

    #[serde(skip)]
    pub username: Option<String>,

    #[serde(skip)]
    pub password: Option<String>,
}

const fn default_timeout_ms() -> u64 {
    15_000
}

const fn default_page_size() -> u32 {
    100
}

fn default_model_root() -> String {
    "/models".into()
}

impl HarborSettings {
    #[must_use]
    pub fn to_source_config(&self, models_dir: &Path) -> HarborSourceConfig {
        HarborSourceConfig {
            url: self.url.clone(),
            project: self.project.clone(),
            username: self.username.clone(),
            password: self.password.clone(),
            timeout: Duration::from_millis(self.timeout_ms),
            page_size: self.page_size,
            model_root: self.model_root.clone(),
            models_dir: models_dir.to_path_buf(),
        }
    }
}
