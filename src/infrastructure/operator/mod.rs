//! Operator implementations for inbound adapters.

pub mod diagnostic;
pub mod entry;
pub mod inventory;
pub mod runtime;

mod shared;
