//! Model runtime backed by per-model TensorFlow Serving containers.
//!
//! `detect` recognises SavedModel directories, asks the serving backend for a
//! ready container keyed by the registered model name and hands back a remote
//! handle on its predict URL.
//! Predictions are forwarded over HTTP.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::domain::{LoadedModel, ModelHandle, ModelInfo};
use crate::error::{ModelError, Result};
use crate::port::outbound::runtime::ModelRuntime;
use crate::port::outbound::serving::ServingBackend;

pub const SAVED_MODEL_FORMAT: &str = "tensorflow-savedmodel";

/// Whether `path` is a SavedModel base directory: at least one numeric
/// version directory holding `saved_model.pb`.
#[must_use]
pub fn is_saved_model(path: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(path) else {
        return false;
    };
    entries.filter_map(std::result::Result::ok).any(|entry| {
        let numeric = entry
            .file_name()
            .to_str()
            .is_some_and(|name| !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()));
        numeric && entry.path().join("saved_model.pb").is_file()
    })
}

/// Request body for the REST predict API.
///
/// An `{"input": ...}` envelope is unwrapped; anything else is sent as the
/// instances verbatim.
#[must_use]
pub fn predict_body(input: Value) -> Value {
    let instances = match input {
        Value::Object(mut map) if map.contains_key("input") => {
            map.remove("input").unwrap_or(Value::Null)
        }
        other => other,
    };
    json!({ "instances": instances })
}

pub struct ServingRuntime {
    backend: Arc<dyn ServingBackend>,
    http: HttpClient,
}

impl ServingRuntime {
    pub fn new(backend: Arc<dyn ServingBackend>, timeout: Duration) -> Self {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Self { backend, http }
    }
}

#[async_trait]
impl ModelRuntime for ServingRuntime {
    async fn detect(&self, name: &str, path: &Path) -> Result<Option<LoadedModel>> {
        let owned = path.to_path_buf();
        let saved_model = tokio::task::spawn_blocking(move || is_saved_model(&owned))
            .await
            .unwrap_or(false);
        if !saved_model {
            debug!(path = %path.display(), "Not a SavedModel directory");
            return Ok(None);
        }

        let record = self.backend.ensure(name, path).await?;
        let info = ModelInfo::new(SAVED_MODEL_FORMAT)
            .with_detail("container", record.container_name.clone())
            .with_detail("serving_endpoint", record.serving_endpoint.clone())
            .with_detail("status_endpoint", record.status_endpoint.clone())
            .with_detail("schema", "not introspected");

        Ok(Some(LoadedModel {
            info,
            handle: ModelHandle::Remote {
                predict_url: record.serving_endpoint,
            },
        }))
    }

    async fn predict(&self, path: &Path, handle: &ModelHandle, input: Value) -> Result<Value> {
        let Some(url) = handle.predict_url() else {
            return Err(ModelError::UnsupportedFormat {
                path: path.to_path_buf(),
            }
            .into());
        };

        let response = self.http.post(url).json(&predict_body(input)).send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(ModelError::Prediction(format!("{status}: {}", body.trim())).into());
        }
        Ok(response.json::<Value>().await?)
    }
}
