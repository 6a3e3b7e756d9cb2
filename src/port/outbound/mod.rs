//! Outbound ports (driven side): interfaces implemented by outbound adapters.
//!
//! These contracts describe the external collaborators of the control plane:
//! the model runtime and its serving backend, model sources, the container
//! engine, readiness probes, and the persisted container registry.

pub mod engine;
pub mod probe;
pub mod runtime;
pub mod serving;
pub mod source;
pub mod store;
