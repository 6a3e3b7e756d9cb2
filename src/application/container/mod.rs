//! Per-model inference containers.

pub mod endpoint;
pub mod orchestrator;

pub use endpoint::{Addressing, Endpoint};
pub use orchestrator::{ContainerOrchestrator, OrchestratorConfig};
