//! Inbound adapters that drive the control plane.

pub mod cli;
