//! Modelplane - control plane for per-model inference servers.
//!
//! Discovers machine-learning models in a local directory and, optionally, a
//! remote Git repository. Each model is served from its own TensorFlow Serving
//! container, started on demand and torn down when the model disappears.
//!
//! # Architecture
//!
//! The crate follows a hexagonal layout:
//!
//! - **`domain`** - Model descriptors, container records, change sets
//! - **`port`** - Traits at the boundaries
//!   - `port::inbound` - Model control and operator use-cases
//!   - `port::outbound` - Container engine, readiness probe, record store,
//!     model sources and runtime
//! - **`application`** - Registry, lifecycle, container orchestration,
//!   directory watcher and webhook reconciliation
//! - **`adapter`** - Docker CLI, GitHub contents API, HTTP probe, JSON store,
//!   and the command-line interface
//! - **`infrastructure`** - Configuration, wiring and the foreground runtime
//!
//! # Example
//!
//! ```no_run
//! use modelplane::infrastructure::config::settings::Config;
//! use modelplane::infrastructure::bootstrap::Components;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("modelplane.toml")?;
//!     let components = Components::build(config)?;
//!     println!("watching {}", components.config.models_dir.display());
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
