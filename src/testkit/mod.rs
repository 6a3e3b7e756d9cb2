//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`engine`] - In-memory [`ContainerEngine`](crate::port::outbound::engine::ContainerEngine).
//! - [`probe`] - Scripted readiness probe.
//! - [`store`] - In-memory container record store with failure injection.
//! - [`runtime`] - In-process model runtime that records loads and releases.
//! - [`source`] - Static model source standing in for a remote repository.
//! - [`config`] - Canonical test configurations with short timings.
//! - [`domain`] - Builders for descriptors, records and artifacts.
//! - [`plane`] - A fully wired control plane over the fakes above.

pub mod config;
pub mod domain;
pub mod engine;
pub mod plane;
pub mod probe;
pub mod runtime;
pub mod source;
pub mod store;
