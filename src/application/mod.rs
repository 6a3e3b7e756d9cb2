//! Application services (use cases).
//!
//! These services coordinate the domain types with the outbound ports to
//! implement discovery, activation and container management.

pub mod container;
pub mod control;
pub mod lifecycle;
pub mod locks;
pub mod registry;
pub mod sync;
pub mod watcher;
pub mod webhook;
