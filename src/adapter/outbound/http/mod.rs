//! HTTP readiness probing.

pub mod probe;

pub use probe::TfServingProbe;
