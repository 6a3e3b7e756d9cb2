//! GitHub repository model source.

pub mod source;

pub use source::{GitHubSource, GitHubSourceConfig};
