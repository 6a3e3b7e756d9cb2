//! Application orchestration.
//!
//! Runtime wiring and lifecycle management for the foreground control plane.

pub mod health;
pub mod runtime;

pub use health::{health_check, HealthCheck, HealthReport, HealthStatus};
pub use runtime::{run_with_shutdown, serve, teardown};
