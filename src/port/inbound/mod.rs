//! Inbound (driving) ports consumed by inbound adapters.
//!
//! - [`control`]: activate/deactivate/status/list/predict for the request layer
//! - [`operator`]: run/inventory/diagnostics for the CLI

pub mod control;
pub mod operator;
