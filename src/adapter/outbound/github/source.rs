//! Models stored at the root of a GitHub repository.
//!
//! Every top-level entry of the repository (file or directory) is one model,
//! keyed by its entry name. Listings and lookups go through the contents API;
//! materializing downloads the entry into the local models directory.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::adapter::outbound::staging;
use crate::domain::{ModelDescriptor, ModelName, SourceKind};
use crate::error::{Error, Result};
use crate::port::outbound::source::ModelSource;

/// Connection settings for a repository source.
#[derive(Clone)]
pub struct GitHubSourceConfig {
    /// `owner/name`.
    pub repo: String,
    pub branch: String,
    pub api_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
    /// Where downloaded models are placed.
    pub models_dir: PathBuf,
}

impl fmt::Debug for GitHubSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSourceConfig")
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("models_dir", &self.models_dir)
            .finish()
    }
}

/// One entry returned by the contents API.
#[derive(Debug, Clone, Deserialize)]
pub struct ContentEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

impl ContentEntry {
    fn is_dir(&self) -> bool {
        self.kind == "dir"
    }
}

/// Contents API answers with an array for directories, an object for files.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Contents {
    Dir(Vec<ContentEntry>),
    File(ContentEntry),
}

/// Descriptors for the non-hidden entries of a root listing.
#[must_use]
pub fn descriptors_from_listing(entries: &[ContentEntry]) -> BTreeMap<ModelName, ModelDescriptor> {
    entries
        .iter()
        .filter(|entry| !entry.name.starts_with('.'))
        .filter(|entry| entry.is_dir() || entry.kind == "file")
        .map(|entry| {
            let name = ModelName::new(entry.name.clone());
            let descriptor =
                ModelDescriptor::remote(name.clone(), SourceKind::RemoteRepo, entry.path.clone());
            (name, descriptor)
        })
        .collect()
}

fn fetch_error(context: &str, err: impl fmt::Display) -> Error {
    Error::RemoteFetch(format!("{context}: {err}"))
}

pub struct GitHubSource {
    config: GitHubSourceConfig,
    http: HttpClient,
}

impl GitHubSource {
    pub fn new(config: GitHubSourceConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("modelplane/", env!("CARGO_PKG_VERSION"))),
        );
        if let Some(token) = &config.token {
            let value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|e| fetch_error("invalid GITHUB_TOKEN", e))?;
            headers.insert(AUTHORIZATION, value);
        }

        let http = HttpClient::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| fetch_error("failed to build HTTP client", e))?;
        Ok(Self { config, http })
    }

    /// Contents API URL for a repository-relative path on the configured branch.
    pub fn contents_url(&self, path: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.api_url)?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| fetch_error("api_url", "cannot be a base URL"))?;
            segments.pop_if_empty().push("repos");
            segments.extend(self.config.repo.split('/').filter(|p| !p.is_empty()));
            segments.push("contents");
            segments.extend(path.split('/').filter(|p| !p.is_empty()));
        }
        url.query_pairs_mut()
            .append_pair("ref", &self.config.branch);
        Ok(url)
    }

    /// Fetch contents of `path`; `Ok(None)` on 404.
    async fn contents(&self, path: &str) -> Result<Option<Contents>> {
        let url = self.contents_url(path)?;
        debug!(url = %url, "Fetching repository contents");
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| fetch_error("contents request failed", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = response
            .error_for_status()
            .map_err(|e| fetch_error("contents request rejected", e))?;
        let contents = response
            .json::<Contents>()
            .await
            .map_err(|e| fetch_error("unexpected contents response", e))?;
        Ok(Some(contents))
    }

    async fn download_file(&self, entry: &ContentEntry, target: &Path) -> Result<()> {
        let url = entry
            .download_url
            .as_deref()
            .ok_or_else(|| fetch_error(&entry.path, "no download URL"))?;
        let bytes = self
            .http
            .get(url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| fetch_error("download failed", e))?
            .bytes()
            .await
            .map_err(|e| fetch_error("download interrupted", e))?;
        tokio::fs::write(target, &bytes).await?;
        Ok(())
    }

    /// Download `path` into `target`, recursing into directories.
    async fn download_tree(&self, path: &str, target: &Path) -> Result<()> {
        let mut pending = vec![(path.to_string(), target.to_path_buf())];
        while let Some((remote, local)) = pending.pop() {
            match self.contents(&remote).await? {
                None => return Err(fetch_error(&remote, "not found")),
                Some(Contents::File(entry)) => self.download_file(&entry, &local).await?,
                Some(Contents::Dir(entries)) => {
                    tokio::fs::create_dir_all(&local).await?;
                    for entry in entries {
                        let child = local.join(&entry.name);
                        if entry.is_dir() {
                            pending.push((entry.path, child));
                        } else if entry.kind == "file" {
                            self.download_file(&entry, &child).await?;
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ModelSource for GitHubSource {
    fn kind(&self) -> SourceKind {
        SourceKind::RemoteRepo
    }

    async fn list(&self) -> Result<BTreeMap<ModelName, ModelDescriptor>> {
        match self.contents("").await? {
            Some(Contents::Dir(entries)) => Ok(descriptors_from_listing(&entries)),
            Some(Contents::File(_)) => Err(fetch_error("repository root", "is not a directory")),
            None => Err(fetch_error(&self.config.repo, "repository or branch not found")),
        }
    }

    async fn lookup(&self, name: &ModelName) -> Result<Option<ModelDescriptor>> {
        if name.as_str().starts_with('.') {
            return Ok(None);
        }
        Ok(self.contents(name.as_str()).await?.map(|_| {
            ModelDescriptor::remote(name.clone(), SourceKind::RemoteRepo, name.as_str())
        }))
    }

    /// Downloads through a hidden staging path, so the directory watcher
    /// never sees a half-downloaded model.
    async fn materialize(&self, descriptor: &ModelDescriptor) -> Result<PathBuf> {
        let name = descriptor.name.as_str();
        let target = staging::stage(&self.config.models_dir, name, |staging| async move {
            self.download_tree(&descriptor.location, &staging).await
        })
        .await?;
        info!(model = %name, path = %target.display(), "Downloaded model");
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(api_url: &str) -> GitHubSource {
        GitHubSource::new(GitHubSourceConfig {
            repo: "acme/models".into(),
            branch: "main".into(),
            api_url: api_url.into(),
            token: Some("secret".into()),
            timeout: Duration::from_secs(1),
            models_dir: PathBuf::from("/models"),
        })
        .unwrap()
    }

    #[test]
    fn contents_url_encodes_repo_path_and_branch() {
        let source = source("https://api.github.com");
        assert_eq!(
            source.contents_url("").unwrap().as_str(),
            "https://api.github.com/repos/acme/models/contents?ref=main"
        );
        assert_eq!(
            source.contents_url("my model/1").unwrap().as_str(),
            "https://api.github.com/repos/acme/models/contents/my%20model/1?ref=main"
        );
    }

    #[test]
    fn enterprise_api_prefix_is_kept() {
        let source = source("https://git.example.com/api/v3/");
        assert_eq!(
            source.contents_url("m1").unwrap().as_str(),
            "https://git.example.com/api/v3/repos/acme/models/contents/m1?ref=main"
        );
    }

    #[test]
    fn listing_keeps_files_and_dirs() {
        let entries: Vec<ContentEntry> = serde_json::from_str(
            r#"[
                {"name": "m1", "path": "m1", "type": "dir", "download_url": null},
                {"name": "fire.h5", "path": "fire.h5", "type": "file", "download_url": "https://raw/fire.h5"},
                {"name": ".github", "path": ".github", "type": "dir"},
                {"name": "link", "path": "link", "type": "symlink"}
            ]"#,
        )
        .unwrap();
        let models = descriptors_from_listing(&entries);

        let names: Vec<_> = models.keys().map(ModelName::as_str).collect();
        assert_eq!(names, vec!["fire.h5", "m1"]);
        assert_eq!(models["m1"].source, SourceKind::RemoteRepo);
        assert_eq!(models["m1"].location, "m1");
    }

    #[test]
    fn token_is_redacted_in_debug() {
        let debug = format!("{:?}", source("https://api.github.com").config);
        assert!(!debug.contains("secret"));
    }
}
