//! Request-layer control surface.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use super::lifecycle::{Activation, Deactivation, LifecycleManager};
use super::registry::ModelRegistry;
use crate::port::inbound::control::{
    ActivateResponse, ControlError, DeactivateResponse, ModelControlPort, ModelListing,
    ModelStatus, StatusResponse,
};

/// [`ModelControlPort`] backed by the lifecycle manager.
pub struct ControlPlane {
    lifecycle: Arc<LifecycleManager>,
    registry: Arc<ModelRegistry>,
    predict_prefix: String,
    activation_timeout: Duration,
}

impl ControlPlane {
    pub fn new(
        lifecycle: Arc<LifecycleManager>,
        predict_prefix: impl Into<String>,
        activation_timeout: Duration,
    ) -> Self {
        Self {
            registry: Arc::clone(lifecycle.registry()),
            lifecycle,
            predict_prefix: predict_prefix.into(),
            activation_timeout,
        }
    }

    /// Request-layer path that serves predictions for `name`.
    #[must_use]
    pub fn predict_endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.predict_prefix.trim_end_matches('/'), name)
    }
}

#[async_trait]
impl ModelControlPort for ControlPlane {
    /// The activation runs on its own task. When the caller's bound expires
    /// the task keeps going to completion or its own readiness timeout.
    async fn activate(&self, name: &str) -> Result<ActivateResponse, ControlError> {
        let lifecycle = Arc::clone(&self.lifecycle);
        let owned = name.to_string();
        let task = tokio::spawn(async move { lifecycle.activate(&owned).await });

        let outcome = match tokio::time::timeout(self.activation_timeout, task).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(join)) => {
                return Err(ControlError::LoadFailure {
                    name: name.to_string(),
                    reason: join.to_string(),
                })
            }
            Err(_) => {
                warn!(model = %name, timeout_secs = self.activation_timeout.as_secs(), "Activation still running after timeout");
                return Err(ControlError::LoadFailure {
                    name: name.to_string(),
                    reason: format!(
                        "activation did not finish within {}s",
                        self.activation_timeout.as_secs()
                    ),
                });
            }
        };

        match outcome {
            Ok(Activation::Activated(_)) => Ok(ActivateResponse {
                message: format!("Model '{name}' activated"),
                predict_endpoint: self.predict_endpoint(name),
            }),
            Ok(Activation::AlreadyActive(_)) => Err(ControlError::AlreadyActive {
                name: name.to_string(),
                predict_endpoint: self.predict_endpoint(name),
            }),
            Err(e) if e.is_not_found() => Err(ControlError::NotFound {
                name: name.to_string(),
            }),
            Err(e) => Err(ControlError::LoadFailure {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn deactivate(&self, name: &str) -> Result<DeactivateResponse, ControlError> {
        if !self.registry.is_available(name) && !self.registry.is_active(name) {
            return Err(ControlError::NotFound {
                name: name.to_string(),
            });
        }
        match self.lifecycle.deactivate(name).await {
            Deactivation::NotActive => Err(ControlError::AlreadyInactive {
                name: name.to_string(),
            }),
            Deactivation::Deactivated { .. } => Ok(DeactivateResponse {
                message: format!("Model '{name}' deactivated"),
            }),
        }
    }

    fn status(&self, name: &str) -> Result<StatusResponse, ControlError> {
        if !self.registry.is_available(name) {
            return Err(ControlError::NotFound {
                name: name.to_string(),
            });
        }
        Ok(StatusResponse {
            active: self.registry.is_active(name),
        })
    }

    fn list(&self) -> Vec<ModelListing> {
        let active = self.registry.active_models();
        self.registry
            .available_models()
            .into_keys()
            .map(|name| {
                let is_active = active.contains_key(&name);
                ModelListing {
                    endpoint: is_active.then(|| self.predict_endpoint(name.as_str())),
                    status: if is_active {
                        ModelStatus::Active
                    } else {
                        ModelStatus::Inactive
                    },
                    name: name.to_string(),
                }
            })
            .collect()
    }

    async fn predict(&self, name: &str, input: Value) -> Result<Value, ControlError> {
        let model = self.registry.active(name).ok_or_else(|| ControlError::NotFound {
            name: name.to_string(),
        })?;
        self.lifecycle
            .runtime()
            .predict(&model.path, &model.handle, input)
            .await
            .map_err(|e| ControlError::PredictionFailure {
                name: name.to_string(),
                reason: e.to_string(),
            })
    }
}

