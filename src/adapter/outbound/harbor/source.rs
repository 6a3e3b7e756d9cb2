//! Models published as tagged images in a Harbor project.
//!
//! Every repository of the project is one model, keyed by the last segment of
//! its name. Repositories and their artifacts are read through the paged
//! Harbor v2 API. Materializing copies the model directory out of the image
//! through the container engine.

use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use crate::adapter::outbound::staging;
use crate::domain::{ModelDescriptor, ModelName, SourceKind};
use crate::error::{Error, Result};
use crate::port::outbound::engine::ContainerEngine;
use crate::port::outbound::source::ModelSource;

/// Tag preferred when a repository carries several.
const PREFERRED_TAG: &str = "latest";

/// Connection settings for a registry source.
#[derive(Clone)]
pub struct HarborSourceConfig {
    /// Registry base URL, e.g. `https://harbor.example.com`.
    pub url: String,
    pub project: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
    pub page_size: u32,
    /// Directory inside each image holding `<model>/`.
    pub model_root: String,
    /// Where copied models are placed.
    pub models_dir: PathBuf,
}

impl fmt::Debug for HarborSourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarborSourceConfig")
            .field("url", &self.url)
            .field("project", &self.project)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("page_size", &self.page_size)
            .field("model_root", &self.model_root)
            .field("models_dir", &self.models_dir)
            .finish()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    /// `<project>/<repo>`.
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artifact {
    /// `null` for untagged artifacts.
    #[serde(default)]
    pub tags: Option<Vec<Tag>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// Drain a paged listing, one request per page, until a page comes back
/// empty or short.
pub async fn collect_pages<T, F, Fut>(page_size: u32, mut fetch: F) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Vec<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let batch = fetch(page).await?;
        let short = batch.len() < page_size as usize;
        items.extend(batch);
        if short {
            return Ok(items);
        }
        page += 1;
    }
}

/// Registry host and path as used in image references.
fn registry_host(url: &str) -> &str {
    url.split_once("://")
        .map_or(url, |(_, rest)| rest)
        .trim_end_matches('/')
}

/// Repository name relative to `project`.
fn relative_repo<'a>(project: &str, full_name: &'a str) -> &'a str {
    full_name
        .strip_prefix(project)
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(full_name)
}

/// One descriptor per model name.
///
/// The descriptor's location is the full image reference. `latest` wins when
/// present, otherwise the first tag listed, which Harbor orders newest first.
#[must_use]
pub fn descriptors_from_artifacts(
    url: &str,
    project: &str,
    repositories: &[(Repository, Vec<Artifact>)],
) -> BTreeMap<ModelName, ModelDescriptor> {
    let host = registry_host(url);
    let mut chosen: BTreeMap<ModelName, (String, String)> = BTreeMap::new();

    for (repository, artifacts) in repositories {
        let repo = relative_repo(project, &repository.name);
        let Some(model) = repo.rsplit('/').next().filter(|m| !m.is_empty()) else {
            continue;
        };
        let tags = artifacts
            .iter()
            .flat_map(|artifact| artifact.tags.iter().flatten());
        for tag in tags {
            let image = format!("{host}/{}:{}", repository.name, tag.name);
            let name = ModelName::new(model);
            match chosen.get(&name) {
                Some((existing, _)) if existing == PREFERRED_TAG => {}
                Some(_) if tag.name != PREFERRED_TAG => {}
                _ => {
                    chosen.insert(name, (tag.name.clone(), image));
                }
            }
        }
    }

    chosen
        .into_iter()
        .map(|(name, (_, image))| {
            let descriptor =
                ModelDescriptor::remote(name.clone(), SourceKind::RegistrySource, image);
            (name, descriptor)
        })
        .collect()
}

fn fetch_error(context: &str, err: impl fmt::Display) -> Error {
    Error::RemoteFetch(format!("{context}: {err}"))
}

pub struct HarborSource {
    config: HarborSourceConfig,
    http: HttpClient,
    engine: Arc<dyn ContainerEngine>,
}

impl HarborSource {
    pub fn new(config: HarborSourceConfig, engine: Arc<dyn ContainerEngine>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| fetch_error("failed to build HTTP client", e))?;
        Ok(Self {
            config,
            http,
            engine,
        })
    }

    /// API URL under `projects/<project>/repositories`, with `segments`
    /// appended and paging parameters set.
    pub fn repositories_url(&self, segments: &[&str], page: u32) -> Result<Url> {
        let mut url = Url::parse(&self.config.url)?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| fetch_error("url", "cannot be a base URL"))?;
            path.pop_if_empty()
                .extend(["api", "v2.0", "projects", self.config.project.as_str(), "repositories"])
                .extend(segments);
        }
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &self.config.page_size.to_string());
        Ok(url)
    }

    /// One page of repositories, or of `repo`'s artifacts.
    async fn page<T: DeserializeOwned>(&self, repo: Option<&str>, page: u32) -> Result<Vec<T>> {
        let url = match repo {
            Some(repo) => self.repositories_url(&[repo, "artifacts"], page)?,
            None => self.repositories_url(&[], page)?,
        };
        debug!(url = %url, "Fetching registry page");
        let mut request = self.http.get(url);
        if let Some(username) = &self.config.username {
            request = request.basic_auth(username, self.config.password.as_deref());
        }
        request
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| fetch_error("registry request failed", e))?
            .json::<Vec<T>>()
            .await
            .map_err(|e| fetch_error("unexpected registry response", e))
    }

    async fn repositories(&self) -> Result<Vec<Repository>> {
        collect_pages(self.config.page_size, |page| self.page(None, page)).await
    }

    async fn artifacts(&self, repository: &Repository) -> Result<Vec<Artifact>> {
        let repo = relative_repo(&self.config.project, &repository.name);
        collect_pages(self.config.page_size, move |page| self.page(Some(repo), page)).await
    }
}

#[async_trait]
impl ModelSource for HarborSource {
    fn kind(&self) -> SourceKind {
        SourceKind::RegistrySource
    }

    async fn list(&self) -> Result<BTreeMap<ModelName, ModelDescriptor>> {
        let mut listing = Vec::new();
        for repository in self.repositories().await? {
            let artifacts = self.artifacts(&repository).await?;
            listing.push((repository, artifacts));
        }
        Ok(descriptors_from_artifacts(
            &self.config.url,
            &self.config.project,
            &listing,
        ))
    }

    async fn materialize(&self, descriptor: &ModelDescriptor) -> Result<PathBuf> {
        let name = descriptor.name.as_str();
        let source = format!("{}/{name}", self.config.model_root.trim_end_matches('/'));
        let target = staging::stage(&self.config.models_dir, name, |staging| {
            let source = &source;
            async move {
                self.engine
                    .copy_from_image(&descriptor.location, source, &staging)
                    .await
            }
        })
        .await?;
        info!(model = %name, image = %descriptor.location, path = %target.display(), "Copied model from registry");
        Ok(target)
    }
}
