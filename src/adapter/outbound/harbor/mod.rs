//! Harbor container registry model source.

pub mod source;

pub use source::{HarborSource, HarborSourceConfig};
