//! Readiness probe for TensorFlow Serving's model status API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::warn;

use crate::port::outbound::probe::{ProbeStatus, ReadinessProbe};

#[derive(Debug, Deserialize)]
struct ModelStatusResponse {
    #[serde(default)]
    model_version_status: Vec<VersionStatus>,
}

#[derive(Debug, Deserialize)]
struct VersionStatus {
    #[serde(default)]
    state: String,
}

/// Whether any reported model version is `AVAILABLE`.
pub fn any_version_available(body: &serde_json::Value) -> bool {
    serde_json::from_value::<ModelStatusResponse>(body.clone())
        .map(|status| {
            status
                .model_version_status
                .iter()
                .any(|version| version.state == "AVAILABLE")
        })
        .unwrap_or(false)
}

/// Polls `GET /v1/models/<name>` once per check.
pub struct TfServingProbe {
    http: HttpClient,
}

impl TfServingProbe {
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|err| {
                warn!(error = %err, "Failed to build HTTP client, using defaults");
                HttpClient::new()
            });
        Self { http }
    }
}

#[async_trait]
impl ReadinessProbe for TfServingProbe {
    async fn check(&self, status_endpoint: &str) -> ProbeStatus {
        let response = match self.http.get(status_endpoint).send().await {
            Ok(response) => response,
            Err(e) => return ProbeStatus::Unreachable(e.to_string()),
        };
        if !response.status().is_success() {
            return ProbeStatus::Pending;
        }
        match response.json::<serde_json::Value>().await {
            Ok(body) if any_version_available(&body) => ProbeStatus::Available,
            Ok(_) => ProbeStatus::Pending,
            Err(e) => ProbeStatus::Unreachable(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn available_when_any_version_is() {
        let body = json!({
            "model_version_status": [
                {"version": "1", "state": "LOADING"},
                {"version": "2", "state": "AVAILABLE", "status": {"error_code": "OK"}}
            ]
        });
        assert!(any_version_available(&body));
    }

    #[test]
    fn pending_states_are_not_available() {
        assert!(!any_version_available(&json!({
            "model_version_status": [{"version": "1", "state": "LOADING"}]
        })));
        assert!(!any_version_available(&json!({})));
        assert!(!any_version_available(&json!({"error": "Servable not found"})));
    }
}
