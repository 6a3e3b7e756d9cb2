//! Model control surface consumed by the request layer.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Typed outcomes for control operations that did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    #[error("model '{name}' not found")]
    NotFound { name: String },

    #[error("model '{name}' is already active")]
    AlreadyActive {
        name: String,
        predict_endpoint: String,
    },

    #[error("model '{name}' is already inactive")]
    AlreadyInactive { name: String },

    #[error("failed to load model '{name}': {reason}")]
    LoadFailure { name: String, reason: String },

    #[error("prediction for '{name}' failed: {reason}")]
    PredictionFailure { name: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivateResponse {
    pub message: String,
    pub predict_endpoint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeactivateResponse {
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusResponse {
    pub active: bool,
}

/// Activation state reported in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelListing {
    pub name: String,
    pub status: ModelStatus,
    /// Prediction endpoint while active.
    pub endpoint: Option<String>,
}

/// Capability surface exposed to whatever serves requests.
#[async_trait]
pub trait ModelControlPort: Send + Sync {
    async fn activate(&self, name: &str) -> Result<ActivateResponse, ControlError>;

    async fn deactivate(&self, name: &str) -> Result<DeactivateResponse, ControlError>;

    fn status(&self, name: &str) -> Result<StatusResponse, ControlError>;

    /// Every available model, sorted by name.
    fn list(&self) -> Vec<ModelListing>;

    /// Resolve `name` through the active set and delegate to the model runtime.
    async fn predict(&self, name: &str, input: Value) -> Result<Value, ControlError>;
}
