//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! # Available Ports
//!
//! - [`inbound::control::ModelControlPort`] - Request-layer control surface
//! - [`outbound::runtime::ModelRuntime`] - Opaque model loader and predictor
//! - [`outbound::serving::ServingBackend`] - Ready out-of-process model servers
//! - [`outbound::source::ModelSource`] - Discoverable model listings
//! - [`outbound::engine::ContainerEngine`] - Per-model inference containers
//! - [`outbound::probe::ReadinessProbe`] - Serving readiness checks
//! - [`outbound::store::ContainerRecordStore`] - Persisted container registry

pub mod inbound;
pub mod outbound;
