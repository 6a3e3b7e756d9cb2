//! Readiness probe port.

use async_trait::async_trait;

/// Result of a single readiness check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeStatus {
    /// The server reports the model as available.
    Available,
    /// The server answered but the model is not available yet.
    Pending,
    /// The endpoint could not be reached or answered garbage.
    Unreachable(String),
}

#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    /// Check a status endpoint once.
    async fn check(&self, status_endpoint: &str) -> ProbeStatus;
}
