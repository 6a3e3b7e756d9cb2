//! Operator-facing inbound ports consumed by CLI adapters.

pub mod diagnostic;
pub mod inventory;
pub mod port;
pub mod runtime;
