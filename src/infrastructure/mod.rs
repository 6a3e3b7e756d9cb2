//! Infrastructure layer.
//!
//! Provides technical concerns that support the application without containing
//! business logic: configuration, runtime wiring and the foreground process
//! lifecycle.
//!
//! # Submodules
//!
//! - [`bootstrap`] - Composition root for runtime wiring
//! - [`config`] - Configuration loading and validation
//! - [`operator`] - CLI operator interface
//! - [`orchestration`] - Runtime loop and health reporting

pub mod bootstrap;
pub mod config;
pub mod operator;
pub mod orchestration;
