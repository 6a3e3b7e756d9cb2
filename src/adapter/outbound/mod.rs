//! Outbound adapters (driven side).

pub mod docker;
pub mod github;
pub mod harbor;
pub mod http;
pub mod local;
pub mod runtime;
pub mod staging;
pub mod store;
