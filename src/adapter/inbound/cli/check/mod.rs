//! Configuration and readiness validation command handlers.

pub mod config;
pub mod health;
